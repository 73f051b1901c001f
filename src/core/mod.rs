//! Core domain models for pipe
//!
//! This module defines the values threaded between steps, the step
//! abstraction, and the pipeline composed from steps.

pub mod error;
pub mod ordinal;
pub mod pipeline;
pub mod step;
pub mod value;

pub use error::*;
pub use ordinal::*;
pub use pipeline::*;
pub use step::*;
pub use value::*;
