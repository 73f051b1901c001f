//! Execution engine - walks the chain, threading the frame between steps

use crate::core::{
    error::{panic_message, PipeError},
    ordinal::Ordinal,
    pipeline::Entry,
    step::ArgumentError,
    value::{Slot, Value},
};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace};

/// Run `entries` in order with `args` as the initial frame
///
/// Panics raised by any step are caught here, once for the whole chain.
pub(crate) fn execute(entries: &[Entry], args: Vec<Value>) -> Result<Vec<Value>, PipeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| run(entries, args))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            debug!("Step panicked: {}", message);
            Err(PipeError::Panicked(message))
        }
    }
}

fn run(entries: &[Entry], args: Vec<Value>) -> Result<Vec<Value>, PipeError> {
    let mut frame = args;

    for (index, entry) in entries.iter().enumerate() {
        let ordinal = Ordinal::from_index(index);
        let step = match entry {
            Entry::Callable(step) => step,
            Entry::Opaque { type_name } => {
                return Err(PipeError::NotCallable {
                    ordinal,
                    type_name: *type_name,
                });
            }
        };

        let arity = step.arity();
        if !arity.accepts(frame.len()) {
            return Err(PipeError::ArityMismatch {
                ordinal,
                expected: arity,
                actual: frame.len(),
            });
        }

        trace!(
            "Invoking {} step {} with {} argument(s)",
            ordinal,
            step.name(),
            frame.len()
        );

        let slots = step
            .call(frame)
            .map_err(|e| argument_error(ordinal, e))?;
        frame = partition(ordinal, slots)?;
    }

    Ok(frame)
}

/// Split returned slots into the next frame, stopping at the first error
fn partition(ordinal: Ordinal, slots: Vec<Slot>) -> Result<Vec<Value>, PipeError> {
    let mut frame = Vec::with_capacity(slots.len());

    for slot in slots {
        match slot {
            Slot::Data(value) => frame.push(value),
            Slot::Error(None) => {}
            Slot::Error(Some(source)) => {
                debug!("{} step failed: {}", ordinal, source);
                return Err(PipeError::Failed { ordinal, source });
            }
        }
    }

    Ok(frame)
}

fn argument_error(ordinal: Ordinal, error: ArgumentError) -> PipeError {
    match error {
        ArgumentError::Count { expected, actual } => PipeError::ArityMismatch {
            ordinal,
            expected,
            actual,
        },
        ArgumentError::TypeMismatch {
            position,
            expected,
            found,
        } => PipeError::ArgumentType {
            ordinal,
            position,
            expected,
            found,
        },
    }
}
