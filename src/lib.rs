//! pipe - compose heterogeneous functions into a single error-aware pipeline
//!
//! Each step receives the data outputs of the step before it. A step that
//! returns an error stops the pipeline, and the error is reported together
//! with the step's position:
//!
//! ```
//! use pipe::{args, pipe};
//!
//! let pipeline = pipe![
//!     |n: i32| if n > 0 { Ok(n * n) } else { Err("n must be positive") },
//!     |n: i32| n / 2,
//! ];
//!
//! assert!(pipeline.call(args![6]).is_ok());
//!
//! let err = pipeline.call(args![-1]).unwrap_err();
//! assert_eq!(err.to_string(), "1st func failed: n must be positive");
//! ```

pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{ordinal, Ordinal, PipeError, Pipeline, PipelineBuilder};
pub use crate::core::{Arity, ArgumentError, Data, FnStep, IntoSlots, IntoStep, Slots, Step, Variadic};
pub use crate::core::{BoxError, Slot, Value};

/// Build a [`Pipeline`] from steps, in call order
///
/// `pipe![]` is the empty pipeline.
#[macro_export]
macro_rules! pipe {
    () => {
        $crate::Pipeline::empty()
    };
    ($($step:expr),+ $(,)?) => {
        $crate::Pipeline::builder()
            $(.step($step))+
            .build()
    };
}

/// Build the initial arguments of a pipeline invocation
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::new($arg)),+]
    };
}
