//! Step abstraction and the adapters turning plain functions into steps

use crate::core::error::PipeError;
use crate::core::value::{BoxError, Slot, Value};
use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Number of inputs a step accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Exact(usize),
    /// Any number of arguments, but at least `min`
    Variadic { min: usize },
}

impl Arity {
    /// Check whether a frame of `count` values satisfies this arity
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Variadic { min } => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Variadic { min } => write!(f, "at least {}", min),
        }
    }
}

/// Arguments handed to a step did not fit its parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("expected {expected} argument(s), got {actual}")]
    Count { expected: Arity, actual: usize },

    #[error("argument {position} expected {expected}, got {found}")]
    TypeMismatch {
        /// 1-based parameter position
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// A callable unit of a pipeline
///
/// Implementations receive the current frame and return their results as
/// ordered slots, each tagged as data or error by its declared kind.
pub trait Step: Send + Sync {
    /// Number of inputs this step accepts
    fn arity(&self) -> Arity;

    /// Number of data outputs, when known without running the step
    fn outputs(&self) -> Option<usize> {
        None
    }

    /// Invoke the step with the current frame
    fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError>;

    /// Label used in log output
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Check the step's own structure without running it
    ///
    /// `available` is the number of values the step will receive, when
    /// known. Steps composed of other steps override this.
    fn check_shape(&self, _available: Option<usize>) -> Result<(), PipeError> {
        Ok(())
    }
}

impl<S: Step + ?Sized> Step for Arc<S> {
    fn arity(&self) -> Arity {
        (**self).arity()
    }

    fn outputs(&self) -> Option<usize> {
        (**self).outputs()
    }

    fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError> {
        (**self).call(args)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check_shape(&self, available: Option<usize>) -> Result<(), PipeError> {
        (**self).check_shape(available)
    }
}

impl<S: Step + ?Sized> Step for Box<S> {
    fn arity(&self) -> Arity {
        (**self).arity()
    }

    fn outputs(&self) -> Option<usize> {
        (**self).outputs()
    }

    fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError> {
        (**self).call(args)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn check_shape(&self, available: Option<usize>) -> Result<(), PipeError> {
        (**self).check_shape(available)
    }
}

/// Conversion of a function's return value into tagged slots
pub trait IntoSlots {
    fn into_slots(self) -> Vec<Slot>;

    /// Number of data slots produced, when fixed by the type
    fn data_count() -> Option<usize>;
}

/// Wrapper marking an arbitrary type as a single data output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data<T>(pub T);

impl<T: Any + Send> IntoSlots for Data<T> {
    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::data(self.0)]
    }

    fn data_count() -> Option<usize> {
        Some(1)
    }
}

/// Return shape decided at runtime
#[derive(Debug)]
pub struct Slots(pub Vec<Slot>);

impl IntoSlots for Slots {
    fn into_slots(self) -> Vec<Slot> {
        self.0
    }

    fn data_count() -> Option<usize> {
        None
    }
}

impl IntoSlots for Value {
    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::Data(self)]
    }

    fn data_count() -> Option<usize> {
        Some(1)
    }
}

impl IntoSlots for () {
    fn into_slots(self) -> Vec<Slot> {
        Vec::new()
    }

    fn data_count() -> Option<usize> {
        Some(0)
    }
}

impl<T, E> IntoSlots for Result<T, E>
where
    T: IntoSlots,
    E: Into<BoxError>,
{
    fn into_slots(self) -> Vec<Slot> {
        match self {
            Ok(value) => {
                let mut slots = value.into_slots();
                slots.push(Slot::ok());
                slots
            }
            Err(error) => vec![Slot::Error(Some(error.into()))],
        }
    }

    fn data_count() -> Option<usize> {
        T::data_count()
    }
}

macro_rules! impl_data_slot {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoSlots for $ty {
                fn into_slots(self) -> Vec<Slot> {
                    vec![Slot::data(self)]
                }

                fn data_count() -> Option<usize> {
                    Some(1)
                }
            }
        )*
    };
}

impl_data_slot!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
    String, &'static str,
);

impl<T: Any + Send> IntoSlots for Option<T> {
    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::data(self)]
    }

    fn data_count() -> Option<usize> {
        Some(1)
    }
}

/// Slots returned as-is; wrap a vector in [`Data`] to pass it as one value
impl IntoSlots for Vec<Slot> {
    fn into_slots(self) -> Vec<Slot> {
        self
    }

    fn data_count() -> Option<usize> {
        None
    }
}

impl<K: Any + Send, V: Any + Send> IntoSlots for HashMap<K, V> {
    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::data(self)]
    }

    fn data_count() -> Option<usize> {
        Some(1)
    }
}

impl<K: Any + Send, V: Any + Send> IntoSlots for BTreeMap<K, V> {
    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::data(self)]
    }

    fn data_count() -> Option<usize> {
        Some(1)
    }
}

macro_rules! impl_tuple_slots {
    ($n:expr; $($ty:ident),+) => {
        impl<$($ty: Any + Send),+> IntoSlots for ($($ty,)+) {
            #[allow(non_snake_case)]
            fn into_slots(self) -> Vec<Slot> {
                let ($($ty,)+) = self;
                vec![$(Slot::data($ty)),+]
            }

            fn data_count() -> Option<usize> {
                Some($n)
            }
        }
    };
}

impl_tuple_slots!(1; A);
impl_tuple_slots!(2; A, B);
impl_tuple_slots!(3; A, B, C);
impl_tuple_slots!(4; A, B, C, D);
impl_tuple_slots!(5; A, B, C, D, E);
impl_tuple_slots!(6; A, B, C, D, E, G);

/// Conversion into a [`Step`]
///
/// `Marker` only disambiguates the blanket implementations; callers never
/// name it.
pub trait IntoStep<Marker> {
    type Step: Step + 'static;

    fn into_step(self) -> Self::Step;
}

#[doc(hidden)]
pub struct IsStep;

impl<S: Step + 'static> IntoStep<IsStep> for S {
    type Step = S;

    fn into_step(self) -> S {
        self
    }
}

/// A plain function or closure adapted into a step
pub struct FnStep<F, Marker> {
    f: F,
    _marker: PhantomData<fn() -> Marker>,
}

struct ArgCursor {
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl ArgCursor {
    fn take<T: Any>(&mut self) -> Result<T, ArgumentError> {
        self.position += 1;
        let position = self.position;
        let value = self.values.next().ok_or(ArgumentError::Count {
            expected: Arity::Exact(position),
            actual: position - 1,
        })?;
        value
            .downcast::<T>()
            .map_err(|value| ArgumentError::TypeMismatch {
                position,
                expected: type_name::<T>(),
                found: value.type_name(),
            })
    }
}

macro_rules! impl_fn_step {
    ($n:expr; $($arg:ident),*) => {
        impl<F, R, $($arg,)*> Step for FnStep<F, fn($($arg,)*) -> R>
        where
            F: Fn($($arg),*) -> R + Send + Sync,
            R: IntoSlots,
            $($arg: Any + Send,)*
        {
            fn arity(&self) -> Arity {
                Arity::Exact($n)
            }

            fn outputs(&self) -> Option<usize> {
                R::data_count()
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError> {
                if args.len() != $n {
                    return Err(ArgumentError::Count {
                        expected: Arity::Exact($n),
                        actual: args.len(),
                    });
                }
                let mut cursor = ArgCursor {
                    values: args.into_iter(),
                    position: 0,
                };
                $(let $arg = cursor.take::<$arg>()?;)*
                Ok((self.f)($($arg),*).into_slots())
            }

            fn name(&self) -> &'static str {
                type_name::<F>()
            }
        }

        impl<F, R, $($arg,)*> IntoStep<fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoSlots + 'static,
            $($arg: Any + Send,)*
        {
            type Step = FnStep<F, fn($($arg,)*) -> R>;

            fn into_step(self) -> Self::Step {
                FnStep {
                    f: self,
                    _marker: PhantomData,
                }
            }
        }
    };
}

impl_fn_step!(0;);
impl_fn_step!(1; A1);
impl_fn_step!(2; A1, A2);
impl_fn_step!(3; A1, A2, A3);
impl_fn_step!(4; A1, A2, A3, A4);
impl_fn_step!(5; A1, A2, A3, A4, A5);
impl_fn_step!(6; A1, A2, A3, A4, A5, A6);

/// A step taking the whole frame, whatever its size
///
/// Useful as a first step receiving caller arguments of varying count.
pub struct Variadic<F> {
    min: usize,
    f: F,
}

impl<F> Variadic<F> {
    pub fn new(min: usize, f: F) -> Self {
        Self { min, f }
    }
}

impl<F, R> Step for Variadic<F>
where
    F: Fn(Vec<Value>) -> R + Send + Sync,
    R: IntoSlots,
{
    fn arity(&self) -> Arity {
        Arity::Variadic { min: self.min }
    }

    fn outputs(&self) -> Option<usize> {
        R::data_count()
    }

    fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError> {
        if !self.arity().accepts(args.len()) {
            return Err(ArgumentError::Count {
                expected: self.arity(),
                actual: args.len(),
            });
        }
        Ok((self.f)(args).into_slots())
    }

    fn name(&self) -> &'static str {
        type_name::<F>()
    }
}
