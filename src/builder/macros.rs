//! Macros for ergonomic key declaration.

/// Declare a fieldless enum and implement
/// [`StateKey`](crate::core::StateKey) for it.
///
/// The generated enum derives `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
/// `Debug`, `Serialize` and `Deserialize`; each variant's name is its
/// state name.
///
/// # Example
///
/// ```
/// use stagehand::core::StateKey;
/// use stagehand::state_enum;
///
/// state_enum! {
///     pub enum GameState {
///         Boot,
///         Menu,
///         Playing,
///         Paused,
///     }
/// }
///
/// assert_eq!(GameState::Paused.name(), "Paused");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateKey for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
