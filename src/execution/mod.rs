//! Pipeline execution

pub(crate) mod engine;
