//! Subscriber setup for the runtime's `tracing` output.
//!
//! The machine logs through `tracing` and never installs a subscriber on
//! its own. Hosts that do not already have one can call [`init_logging`].
//!
//! Every machine event carries a `machine` field holding the machine's id,
//! so output from several machines in one process can be told apart.
//!
//! # Levels
//!
//! - `warn`: non-fatal misuse such as unknown keys, duplicate registrations
//!   and dropped chained requests
//! - `debug`: accepted transitions and rejections
//! - `trace`: per-tick activity
//!
//! # Environment Variables
//!
//! - `STAGEHAND_LOG_LEVEL`: level or filter directive (default `info`)
//! - `STAGEHAND_LOG_FORMAT`: `compact`, `pretty` or `json` (default `compact`)
//! - `RUST_LOG`: standard `tracing-subscriber` filter, takes precedence
//!
//! ```bash
//! RUST_LOG="stagehand::machine=debug" cargo run --example game_loop
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self as layer_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Registry,
};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line per event
    #[default]
    Compact,
    /// Multi-line with source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unknown log format '{0}' (expected compact, pretty or json)")]
    UnknownFormat(String),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install a global subscriber.
///
/// `level` falls back to `STAGEHAND_LOG_LEVEL`, then `info`; `RUST_LOG`
/// overrides both when set. `format` falls back to `STAGEHAND_LOG_FORMAT`,
/// then compact. Fails if a global subscriber is already installed.
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> Result<(), LoggingError> {
    let log_level = level
        .map(str::to_string)
        .or_else(|| std::env::var("STAGEHAND_LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());

    let format = match format
        .map(str::to_string)
        .or_else(|| std::env::var("STAGEHAND_LOG_FORMAT").ok())
    {
        Some(name) => name.parse()?,
        None => LogFormat::default(),
    };

    let filter = if log_level == "off" {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = Registry::default().with(filter);
    match format {
        LogFormat::Compact => registry
            .with(
                layer_fmt::Layer::default()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                layer_fmt::Layer::default()
                    .with_file(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                layer_fmt::Layer::default()
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init()?,
    }

    Ok(())
}

/// [`init_logging`] with every setting left to the environment.
pub fn init_default_logging() -> Result<(), LoggingError> {
    init_logging(None, None)
}
