//! Argument-list adapter for dispatch.
//!
//! Gives `add_task` a variadic feel: tuples of [`IntoValue`] types (up to
//! eight), a pre-built `Vec<Value>`, or `()` for no arguments.

use crate::value::{IntoValue, Value};

/// Anything that can become an ordered argument list of boxes.
///
/// ```
/// use tasklane::{IntoArgs, Value};
///
/// assert_eq!((7i64, "x").into_args(), vec![Value::Int(7), Value::Str("x".into())]);
/// assert_eq!(().into_args(), Vec::<Value>::new());
/// ```
pub trait IntoArgs {
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for Vec<Value> {
    fn into_args(self) -> Vec<Value> {
        self
    }
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_into_args {
    ($($ty:ident @ $idx:tt),+) => {
        impl<$($ty: IntoValue),+> IntoArgs for ($($ty,)+) {
            fn into_args(self) -> Vec<Value> {
                vec![$(self.$idx.into_value()),+]
            }
        }
    };
}

impl_into_args!(T0 @ 0);
impl_into_args!(T0 @ 0, T1 @ 1);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2, T3 @ 3);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2, T3 @ 3, T4 @ 4);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2, T3 @ 3, T4 @ 4, T5 @ 5);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2, T3 @ 3, T4 @ 4, T5 @ 5, T6 @ 6);
impl_into_args!(T0 @ 0, T1 @ 1, T2 @ 2, T3 @ 3, T4 @ 4, T5 @ 5, T6 @ 6, T7 @ 7);
