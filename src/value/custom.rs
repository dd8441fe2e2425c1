//! Opaque user types inside [`Value`](crate::Value) boxes.
//!
//! A user type becomes boxable by implementing [`CustomValue`], which
//! fixes its stable type token. The dyn-safe [`CustomBox`] shim carries
//! the token, downcasting, and structural equality for the boxed form;
//! it is implemented blanket-wise and never by hand.
//!
//! The [`custom_value!`](crate::custom_value) macro derives the whole set
//! ([`CustomValue`], [`IntoValue`](crate::IntoValue),
//! [`FromValue`](crate::FromValue)) in one line.

use std::any::Any;
use std::fmt;

/// An opaque user type that can travel inside a [`Value`](crate::Value) box.
///
/// `TOKEN` must be unique across the application; unwrapping checks the
/// token before downcasting, so two distinct types sharing a token would
/// shadow each other.
///
/// Prefer [`custom_value!`](crate::custom_value) over implementing the
/// trait (and its conversion companions) manually:
///
/// ```
/// use tasklane::{custom_value, Value};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct MyData {
///     a: i64,
///     b: i64,
///     label: String,
/// }
/// custom_value!(MyData, "example.MyData");
///
/// let boxed = Value::custom(MyData { a: 100, b: 200, label: "Hello".into() });
/// assert_eq!(boxed.clone().get::<MyData>().unwrap().label, "Hello");
/// ```
pub trait CustomValue: Any + Clone + PartialEq + Send + Sync + fmt::Debug {
    /// Stable type token identifying this type inside a box.
    const TOKEN: &'static str;
}

/// Dyn-safe carrier for an opaque boxed value.
///
/// Implemented for every [`CustomValue`] via the blanket impl below.
pub trait CustomBox: Any + Send + Sync + fmt::Debug {
    /// The stable token of the concrete type.
    fn token(&self) -> &'static str;

    /// Upcast for downcasting back to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another boxed value of the same token.
    fn eq_box(&self, other: &dyn CustomBox) -> bool;
}

impl<T: CustomValue> CustomBox for T {
    fn token(&self) -> &'static str {
        T::TOKEN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_box(&self, other: &dyn CustomBox) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// Derives [`CustomValue`] plus the [`IntoValue`](crate::IntoValue) /
/// [`FromValue`](crate::FromValue) conversions for an opaque user type.
///
/// The type must be `Debug + Clone + PartialEq + Send + Sync + 'static`.
/// The second argument is the stable type token.
#[macro_export]
macro_rules! custom_value {
    ($ty:ty, $token:literal) => {
        impl $crate::CustomValue for $ty {
            const TOKEN: &'static str = $token;
        }

        impl $crate::IntoValue for $ty {
            fn into_value(self) -> $crate::Value {
                $crate::Value::custom(self)
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::ValueError> {
                value.into_custom::<$ty>()
            }
        }
    };
}
