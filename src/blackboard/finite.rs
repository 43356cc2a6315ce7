//! Pre-write scan for floats JSON cannot hold.
//!
//! `serde_json` stores NaN and the infinities as `null`, which would lose the
//! value's kind and make two different non-finite writes compare equal. The
//! scan walks a value's serialized shape without building anything and stops
//! at the first non-finite float.

use serde::ser::{self, Serialize};
use std::fmt;

#[derive(Debug)]
pub(super) enum ScanError {
    /// A non-finite float was found.
    NonFinite(f64),
    /// The value's own `Serialize` impl failed.
    Custom(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::NonFinite(value) => write!(f, "non-finite number {value}"),
            ScanError::Custom(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ScanError {}

impl ser::Error for ScanError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ScanError::Custom(msg.to_string())
    }
}

/// First non-finite float inside `value`, if any. Errors raised by the
/// value itself are left for the real serialization to report.
pub(super) fn first_non_finite<T: Serialize + ?Sized>(value: &T) -> Option<f64> {
    match value.serialize(FiniteScan) {
        Err(ScanError::NonFinite(found)) => Some(found),
        _ => None,
    }
}

#[derive(Clone, Copy)]
struct FiniteScan;

impl FiniteScan {
    fn check(value: f64) -> Result<(), ScanError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ScanError::NonFinite(value))
        }
    }
}

impl ser::Serializer for FiniteScan {
    type Ok = ();
    type Error = ScanError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), ScanError> {
        Self::check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), ScanError> {
        Self::check(v)
    }

    fn serialize_char(self, _v: char) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, ScanError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, ScanError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    // Map keys become JSON strings, so only values can hold floats that matter.
    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), ScanError> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteScan {
    type Ok = ();
    type Error = ScanError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), ScanError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), ScanError> {
        Ok(())
    }
}
