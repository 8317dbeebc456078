use thiserror::Error;

use crate::session::SessionError;

/// Errors that stop a run before or instead of producing a state.
///
/// Capability failures are not in here: adapters record them on the state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid pipeline input: {0}")]
    InvalidInput(String),

    #[error("A document is required: {0}")]
    MissingDocument(String),

    #[error("Session lookup failed: {0}")]
    Session(#[from] SessionError),
}
