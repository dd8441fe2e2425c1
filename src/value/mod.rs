//! # Dynamic value box crossing the registration boundary.
//!
//! [`Value`] is the uniform container for every argument and result the
//! engine shuttles between a caller and a registered callable. A box holds
//! a primitive scalar, an ordered sequence, a string-keyed mapping, or an
//! opaque user type identified by a stable type token; the distinguished
//! [`Value::Empty`] represents "no value" (callables returning `()`).
//!
//! ## Contents
//! - [`Value`] the box itself; structural equality
//! - [`IntoValue`] / [`FromValue`] wrap/unwrap conversions
//! - [`CustomValue`] opaque user types with a stable token
//!
//! Wrapping happens when dispatch builds an argument list and when a
//! worker returns; unwrapping happens only inside registered invokers.
//! Unwrap failures surface as [`ValueError::Type`](crate::ValueError).

mod convert;
mod custom;

pub use convert::{FromValue, IntoValue};
pub use custom::{CustomBox, CustomValue};

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ValueError;

/// Uniform dynamic value container.
///
/// Cheap to clone: strings and byte buffers are `Arc`-backed, opaque
/// payloads are shared.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value. The result box of a callable returning `()`.
    #[default]
    Empty,
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Byte string.
    Bytes(Arc<[u8]>),
    /// Unicode string.
    Str(Arc<str>),
    /// Ordered sequence of boxes.
    List(Vec<Value>),
    /// Associative mapping with string keys.
    Map(HashMap<String, Value>),
    /// Opaque user-registered type, identified by its type token.
    Custom(Arc<dyn CustomBox>),
}

impl Value {
    /// Wraps any convertible value. Equivalent to calling
    /// [`IntoValue::into_value`].
    pub fn wrap(value: impl IntoValue) -> Value {
        value.into_value()
    }

    /// Boxes an opaque user type under its registered token.
    pub fn custom<T: CustomValue>(value: T) -> Value {
        Value::Custom(Arc::new(value))
    }

    /// Unwraps the box into a concrete type.
    ///
    /// Fails with [`ValueError::Type`](crate::ValueError::Type) when the
    /// contents do not match, including an opaque box whose token differs
    /// from `T`'s.
    pub fn get<T: FromValue>(self) -> Result<T, ValueError> {
        T::from_value(self)
    }

    /// Recovers an opaque user type by token, then by downcast.
    pub fn into_custom<T: CustomValue>(self) -> Result<T, ValueError> {
        match self {
            Value::Custom(boxed) if boxed.token() == T::TOKEN => boxed
                .as_any()
                .downcast_ref::<T>()
                .cloned()
                .ok_or_else(|| ValueError::mismatch(T::TOKEN, "custom type with colliding token")),
            other => Err(ValueError::mismatch(T::TOKEN, other.found_label())),
        }
    }

    /// Whether this is the distinguished empty box.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Short name of the kind of value held, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Custom(_) => "custom",
        }
    }

    fn found_label(&self) -> String {
        match self {
            Value::Custom(boxed) => format!("custom({})", boxed.token()),
            other => other.kind().to_string(),
        }
    }
}

/// Structural equality. Opaque boxes compare token first, then delegate to
/// the concrete type's `PartialEq` through the dyn shim.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => {
                a.token() == b.token() && a.eq_box(b.as_ref())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom_value;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }
    custom_value!(Point, "tests.Point");

    #[derive(Debug, Clone, PartialEq)]
    struct Other(i64);
    custom_value!(Other, "tests.Other");

    #[test]
    fn primitives_round_trip() {
        assert_eq!(Value::wrap(42i64).get::<i64>().unwrap(), 42);
        assert_eq!(Value::wrap(1.5f64).get::<f64>().unwrap(), 1.5);
        assert_eq!(Value::wrap(true).get::<bool>().unwrap(), true);
        assert_eq!(Value::wrap("hi").get::<String>().unwrap(), "hi");
        assert_eq!(
            Value::wrap(vec![1u8, 2, 3]).get::<Vec<u8>>().unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn unit_wraps_to_empty() {
        assert!(Value::wrap(()).is_empty());
        assert_eq!(Value::wrap(()), Value::Empty);
    }

    #[test]
    fn structural_equality() {
        let a = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        let b = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        assert_eq!(a, b);
        assert_ne!(a, Value::List(vec![Value::Int(2), Value::Str("x".into())]));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn unwrap_mismatch_reports_kinds() {
        let err = Value::Int(7).get::<String>().unwrap_err();
        assert_eq!(
            err,
            ValueError::Type {
                expected: "str",
                found: "int".to_string()
            }
        );
    }

    #[test]
    fn int_narrowing_is_checked() {
        assert_eq!(Value::Int(7).get::<i32>().unwrap(), 7);
        assert!(Value::Int(i64::MAX).get::<i32>().is_err());
    }

    #[test]
    fn custom_round_trip_and_equality() {
        let p = Point { x: 1, y: 2 };
        let boxed = Value::custom(p.clone());
        assert_eq!(boxed, Value::custom(p.clone()));
        assert_ne!(boxed, Value::custom(Point { x: 9, y: 2 }));
        assert_eq!(boxed.get::<Point>().unwrap(), p);
    }

    #[test]
    fn custom_token_mismatch_fails_type() {
        let boxed = Value::custom(Point { x: 1, y: 2 });
        let err = boxed.get::<Other>().unwrap_err();
        assert_eq!(
            err,
            ValueError::Type {
                expected: "tests.Other",
                found: "custom(tests.Point)".to_string()
            }
        );
    }

    #[test]
    fn option_unwraps_empty_to_none() {
        assert_eq!(Value::Empty.get::<Option<i64>>().unwrap(), None);
        assert_eq!(Value::Int(3).get::<Option<i64>>().unwrap(), Some(3));
    }
}
