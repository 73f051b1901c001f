//! Pipeline error taxonomy

use crate::core::{
    ordinal::Ordinal,
    step::Arity,
    value::BoxError,
};
use std::any::Any;
use thiserror::Error;

/// Failure of a pipeline invocation
#[derive(Debug, Error)]
pub enum PipeError {
    /// An entry of the pipeline cannot be invoked
    #[error("{ordinal} func is not callable: {type_name}")]
    NotCallable {
        ordinal: Ordinal,
        type_name: &'static str,
    },

    /// The frame does not hold as many values as the step takes
    #[error("{ordinal} func expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        ordinal: Ordinal,
        expected: Arity,
        actual: usize,
    },

    /// A frame value does not have the type the step declares
    #[error("{ordinal} func argument {position} expected {expected}, got {found}")]
    ArgumentType {
        ordinal: Ordinal,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// The step returned an error
    #[error("{ordinal} func failed: {source}")]
    Failed {
        ordinal: Ordinal,
        #[source]
        source: BoxError,
    },

    /// A step panicked
    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

impl PipeError {
    /// Position of the step the error is attributed to
    ///
    /// Panics are caught for the whole pipeline and carry no position.
    pub fn ordinal(&self) -> Option<Ordinal> {
        match self {
            PipeError::NotCallable { ordinal, .. }
            | PipeError::ArityMismatch { ordinal, .. }
            | PipeError::ArgumentType { ordinal, .. }
            | PipeError::Failed { ordinal, .. } => Some(*ordinal),
            PipeError::Panicked(_) => None,
        }
    }

    /// The error returned by the failing step, if it returned one
    pub fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            PipeError::Failed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Take out the error returned by the failing step
    pub fn into_inner(self) -> Option<BoxError> {
        match self {
            PipeError::Failed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Downcast the error returned by the failing step
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.inner().and_then(|e| e.downcast_ref::<E>())
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, PipeError::Panicked(_))
    }
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        return (*msg).to_string();
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return msg.clone();
    }
    "non-string panic payload".to_string()
}
