//! Wrap/unwrap conversions between Rust types and [`Value`] boxes.
//!
//! Unwrap is conservative: no cross-kind coercion. An `Int` box unwraps to
//! `i64` or (checked) `i32`; a `Float` box unwraps to `f64`; nothing
//! converts strings to numbers or vice versa.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ValueError;

use super::Value;

/// Conversion into a [`Value`] box, frozen at registration for a
/// callable's return type and used by dispatch for arguments.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Conversion out of a [`Value`] box, frozen at registration for each
/// parameter position of a callable.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Empty
    }
}

impl FromValue for () {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Empty => Ok(()),
            other => Err(ValueError::mismatch("empty", other.kind())),
        }
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(ValueError::mismatch("int", other.kind())),
        }
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(self.into())
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(n) => i32::try_from(n)
                .map_err(|_| ValueError::mismatch("int (32-bit)", "int out of range")),
            other => Err(ValueError::mismatch("int", other.kind())),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(ValueError::mismatch("float", other.kind())),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::mismatch("bool", other.kind())),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(Arc::from(self))
    }
}

impl<'a> IntoValue for &'a str {
    fn into_value(self) -> Value {
        Value::Str(Arc::from(self))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s.as_ref().to_owned()),
            other => Err(ValueError::mismatch("str", other.kind())),
        }
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Bytes(Arc::from(self))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(b) => Ok(b.as_ref().to_vec()),
            other => Err(ValueError::mismatch("bytes", other.kind())),
        }
    }
}

impl IntoValue for Vec<Value> {
    fn into_value(self) -> Value {
        Value::List(self)
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => Ok(items),
            other => Err(ValueError::mismatch("list", other.kind())),
        }
    }
}

impl IntoValue for HashMap<String, Value> {
    fn into_value(self) -> Value {
        Value::Map(self)
    }
}

impl FromValue for HashMap<String, Value> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(entries) => Ok(entries),
            other => Err(ValueError::mismatch("map", other.kind())),
        }
    }
}

// `None` travels as the empty box.
impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Empty,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Empty => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        n.into_value()
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        n.into_value()
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        f.into_value()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        b.into_value()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        s.into_value()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        s.into_value()
    }
}
