//! Pipeline composition and invocation

use crate::core::{
    error::PipeError,
    ordinal::Ordinal,
    step::{ArgumentError, Arity, IntoStep, Step},
    value::{Slot, Value},
};
use crate::execution::engine;
use std::any::{type_name, Any};
use std::fmt;
use std::iter;
use std::sync::Arc;
use tracing::debug_span;

/// One position of a pipeline
#[derive(Clone)]
pub(crate) enum Entry {
    Callable(Arc<dyn Step>),
    /// A value that was handed in as a step but cannot be invoked
    Opaque { type_name: &'static str },
}

/// An ordered, immutable chain of steps invoked as one unit
///
/// Structural problems (non-callable entries, arity mismatches) are
/// reported while the chain is walked during invocation, or up front via
/// [`Pipeline::validate`]. Building a pipeline never fails and never runs
/// a step.
#[derive(Clone)]
pub struct Pipeline {
    /// Label for log output
    name: Option<String>,

    entries: Arc<Vec<Entry>>,
}

impl Pipeline {
    /// A pipeline with no steps; invoking it does nothing and succeeds
    pub fn empty() -> Self {
        Self {
            name: None,
            entries: Arc::new(Vec::new()),
        }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every step in order, threading data outputs
    pub fn call(&self, args: Vec<Value>) -> Result<(), PipeError> {
        self.evaluate(args).map(drop)
    }

    /// Run every step in order and return the data outputs of the last one
    ///
    /// An empty pipeline returns its arguments unchanged. A panic in any
    /// step is returned as [`PipeError::Panicked`].
    pub fn evaluate(&self, args: Vec<Value>) -> Result<Vec<Value>, PipeError> {
        if self.entries.is_empty() {
            return Ok(args);
        }

        let span = debug_span!(
            "pipeline",
            label = self.name.as_deref().unwrap_or("anonymous"),
            steps = self.entries.len()
        );
        let _enter = span.enter();

        engine::execute(&self.entries, args)
    }

    /// Check the chain's shape without running anything
    ///
    /// Reports non-callable entries anywhere, including inside nested
    /// pipelines. Arity is checked for every step except one that follows
    /// a step whose data output count is only known at runtime.
    pub fn validate(&self, initial_args: usize) -> Result<(), PipeError> {
        self.validate_from(Some(initial_args))
    }

    fn validate_from(&self, mut available: Option<usize>) -> Result<(), PipeError> {
        for (index, entry) in self.entries.iter().enumerate() {
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

            if let Some(actual) = available {
                let expected = step.arity();
                if !expected.accepts(actual) {
                    return Err(PipeError::ArityMismatch {
                        ordinal,
                        expected,
                        actual,
                    });
                }
            }

            step.check_shape(available)
                .map_err(|e| PipeError::Failed {
                    ordinal,
                    source: Box::new(e),
                })?;

            available = step.outputs();
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.entries.len())
            .finish()
    }
}

/// A pipeline nested as a single step
///
/// Takes what its first step takes and yields the data outputs of its
/// last step, plus an error slot carrying any failure.
impl Step for Pipeline {
    fn arity(&self) -> Arity {
        match self.entries.first() {
            Some(Entry::Callable(step)) => step.arity(),
            _ => Arity::Variadic { min: 0 },
        }
    }

    fn outputs(&self) -> Option<usize> {
        match self.entries.last() {
            Some(Entry::Callable(step)) => step.outputs(),
            _ => None,
        }
    }

    fn call(&self, args: Vec<Value>) -> Result<Vec<Slot>, ArgumentError> {
        let slots = match self.evaluate(args) {
            Ok(frame) => frame
                .into_iter()
                .map(Slot::Data)
                .chain(iter::once(Slot::ok()))
                .collect(),
            Err(e) => vec![Slot::error(e)],
        };
        Ok(slots)
    }

    fn check_shape(&self, available: Option<usize>) -> Result<(), PipeError> {
        self.validate_from(available)
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    name: Option<String>,
    entries: Vec<Entry>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the pipeline in log output
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a function, closure or [`Step`]
    pub fn step<M, S: IntoStep<M>>(mut self, step: S) -> Self {
        self.entries.push(Entry::Callable(Arc::new(step.into_step())));
        self
    }

    /// Append an already type-erased step
    pub fn boxed(mut self, step: Arc<dyn Step>) -> Self {
        self.entries.push(Entry::Callable(step));
        self
    }

    /// Append a value whose callability is only known at runtime
    ///
    /// A `Pipeline`, `Arc<dyn Step>` or `Box<dyn Step>` becomes a step;
    /// anything else is kept and reported as not callable when reached.
    pub fn dynamic<T: Any + Send + Sync>(mut self, item: T) -> Self {
        let item: Box<dyn Any + Send + Sync> = Box::new(item);

        let entry = match item.downcast::<Pipeline>() {
            Ok(pipeline) => Entry::Callable(Arc::new(*pipeline)),
            Err(item) => match item.downcast::<Arc<dyn Step>>() {
                Ok(step) => Entry::Callable(*step),
                Err(item) => match item.downcast::<Box<dyn Step>>() {
                    Ok(step) => Entry::Callable(Arc::from(*step)),
                    Err(_) => Entry::Opaque {
                        type_name: type_name::<T>(),
                    },
                },
            },
        };

        self.entries.push(entry);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            entries: Arc::new(self.entries),
        }
    }
}
