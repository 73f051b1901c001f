//! Type-erased values passed between steps

use std::any::{type_name, Any};
use std::fmt;

/// Error type carried by error-tagged return slots
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An owned, type-erased argument or result
///
/// Remembers the name of the type it was created from so that type
/// mismatches can be reported without the original value.
pub struct Value {
    inner: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a value
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the wrapped type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the wrapped value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Take the wrapped value out, or get `self` back if it is not a `T`
    pub fn downcast<T: Any>(self) -> Result<T, Value> {
        let type_name = self.type_name;
        self.inner
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|inner| Value { inner, type_name })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self.type_name)
    }
}

/// One return position of a step, tagged by its declared kind
///
/// The tag comes from the step's declared return shape, never from
/// inspecting the value: a data slot holding an error is still data.
#[derive(Debug)]
pub enum Slot {
    /// A value threaded into the next step
    Data(Value),
    /// An error position; `None` means the step reported no error
    Error(Option<BoxError>),
}

impl Slot {
    pub fn data<T: Any + Send>(value: T) -> Self {
        Slot::Data(Value::new(value))
    }

    /// An error slot holding `error`
    pub fn error(error: impl Into<BoxError>) -> Self {
        Slot::Error(Some(error.into()))
    }

    /// An empty error slot
    pub fn ok() -> Self {
        Slot::Error(None)
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Slot::Data(_))
    }
}
