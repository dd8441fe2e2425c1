//! # Erased call wrappers produced at registration.
//!
//! Registration erases the concrete callable signature behind [`Invoker`].
//! The arity and the per-position unwrap policy are frozen when the
//! closure is converted (via [`IntoInvoker`]); dispatch only ever sees the
//! erased form, so an argument mismatch is detected the moment arguments
//! are supplied, before any task record exists.
//!
//! ```text
//! register(|a: i64, b: String| -> i64 { ... })
//!     └─► FnInvoker<F, fn(i64, String) -> i64>     (arity + unwraps frozen)
//!
//! add_task(ttype, (7, "x"))
//!     └─► invoker.bind([Int(7), Str("x")])
//!             ├─ arity check ──────────► ArgError::Arity
//!             ├─ per-position unwrap ──► ArgError::Position
//!             └─ Ok(BoundCall)          (zero-arity closure for the worker)
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::ArgError;
use crate::value::{FromValue, IntoValue, Value};

/// A registered callable partially applied to its argument list.
///
/// Evaluated exactly once, on the worker thread.
pub type BoundCall = Box<dyn FnOnce() -> Value + Send + 'static>;

/// # Erased call wrapper stored in the registry.
///
/// An invoker owns its arity and coercion policy: [`Invoker::bind`]
/// validates an argument list against the signature frozen at
/// registration and returns the bound call on success.
pub trait Invoker: Send + Sync + 'static {
    /// Number of arguments the registered callable expects.
    fn arity(&self) -> usize;

    /// Validates `args` and partially applies the callable to them.
    fn bind(&self, args: Vec<Value>) -> Result<BoundCall, ArgError>;
}

/// Conversion of a plain `Fn` closure into an erased [`Invoker`].
///
/// Implemented for closures and function pointers of arities 0..=8 whose
/// parameters are [`FromValue`] and whose return is [`IntoValue`]. The
/// `Marker` parameter carries the signature for inference; callers never
/// name it:
///
/// ```
/// use tasklane::{Invoker, IntoInvoker, Value};
///
/// let invoker = (|a: i64, b: i64| a + b).into_invoker();
/// assert_eq!(invoker.arity(), 2);
///
/// let bound = invoker.bind(vec![Value::Int(2), Value::Int(3)]).unwrap();
/// assert_eq!(bound(), Value::Int(5));
/// ```
///
/// A callable returning `()` produces the empty box. A return type that
/// is neither a primitive, `Value`, nor a registered
/// [`CustomValue`](crate::CustomValue) does not satisfy the `IntoValue`
/// bound and is rejected at compile time.
pub trait IntoInvoker<Marker> {
    fn into_invoker(self) -> Arc<dyn Invoker>;
}

/// Invoker backed by a plain `Fn` closure.
struct FnInvoker<F, Marker> {
    func: Arc<F>,
    _marker: PhantomData<fn() -> Marker>,
}

macro_rules! impl_invoker {
    ($arity:literal => $($arg:ident @ $idx:tt),*) => {
        impl<F, R, $($arg,)*> Invoker for FnInvoker<F, fn($($arg,)*) -> R>
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoValue + 'static,
            $($arg: FromValue + Send + 'static,)*
        {
            fn arity(&self) -> usize {
                $arity
            }

            #[allow(unused_variables, unused_mut)]
            fn bind(&self, args: Vec<Value>) -> Result<BoundCall, ArgError> {
                if args.len() != $arity {
                    return Err(ArgError::Arity {
                        expected: $arity,
                        got: args.len(),
                    });
                }
                let mut args = args.into_iter();
                $(
                    let $arg = match args.next() {
                        Some(value) => <$arg>::from_value(value)
                            .map_err(|source| ArgError::Position { index: $idx, source })?,
                        None => {
                            return Err(ArgError::Arity {
                                expected: $arity,
                                got: $idx,
                            })
                        }
                    };
                )*
                let func = Arc::clone(&self.func);
                Ok(Box::new(move || (*func)($($arg),*).into_value()))
            }
        }

        impl<F, R, $($arg,)*> IntoInvoker<fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoValue + 'static,
            $($arg: FromValue + Send + 'static,)*
        {
            fn into_invoker(self) -> Arc<dyn Invoker> {
                Arc::new(FnInvoker::<F, fn($($arg,)*) -> R> {
                    func: Arc::new(self),
                    _marker: PhantomData,
                })
            }
        }
    };
}

impl_invoker!(0 =>);
impl_invoker!(1 => A0 @ 0);
impl_invoker!(2 => A0 @ 0, A1 @ 1);
impl_invoker!(3 => A0 @ 0, A1 @ 1, A2 @ 2);
impl_invoker!(4 => A0 @ 0, A1 @ 1, A2 @ 2, A3 @ 3);
impl_invoker!(5 => A0 @ 0, A1 @ 1, A2 @ 2, A3 @ 3, A4 @ 4);
impl_invoker!(6 => A0 @ 0, A1 @ 1, A2 @ 2, A3 @ 3, A4 @ 4, A5 @ 5);
impl_invoker!(7 => A0 @ 0, A1 @ 1, A2 @ 2, A3 @ 3, A4 @ 4, A5 @ 5, A6 @ 6);
impl_invoker!(8 => A0 @ 0, A1 @ 1, A2 @ 2, A3 @ 3, A4 @ 4, A5 @ 5, A6 @ 6, A7 @ 7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgError;

    #[test]
    fn zero_arity_collapses_unit_to_empty() {
        let invoker = (|| ()).into_invoker();
        assert_eq!(invoker.arity(), 0);
        let bound = invoker.bind(Vec::new()).unwrap();
        assert_eq!(bound(), Value::Empty);
    }

    #[test]
    fn bind_applies_arguments_in_order() {
        let invoker = (|a: i64, b: String| format!("{a}:{b}")).into_invoker();
        let bound = invoker
            .bind(vec![Value::Int(9), Value::Str("x".into())])
            .unwrap();
        assert_eq!(bound(), Value::Str("9:x".into()));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let invoker = (|_: i64| 0i64).into_invoker();
        let err = invoker.bind(Vec::new()).err().unwrap();
        assert!(matches!(err, ArgError::Arity { expected: 1, got: 0 }));
    }

    #[test]
    fn position_mismatch_names_the_index() {
        let invoker = (|_: i64, _: bool| 0i64).into_invoker();
        let err = invoker
            .bind(vec![Value::Int(1), Value::Str("nope".into())])
            .err()
            .unwrap();
        assert!(matches!(err, ArgError::Position { index: 1, .. }));
    }

    #[test]
    fn bound_call_is_reusable_per_bind() {
        let invoker = (|n: i64| n * 2).into_invoker();
        let first = invoker.bind(vec![Value::Int(2)]).unwrap();
        let second = invoker.bind(vec![Value::Int(5)]).unwrap();
        assert_eq!(first(), Value::Int(4));
        assert_eq!(second(), Value::Int(10));
    }
}
