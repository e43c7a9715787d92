//! Workbench errors

use owl_core::ServiceError;
use thiserror::Error;

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;

/// Failures that are handed back to the caller
///
/// Validation problems (missing name, unsupported file type, empty query)
/// never show up here: they are reported as notices and short-circuit.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("Failed to fetch file content: {0}")]
    Fetch(#[source] ServiceError),

    #[error("Failed to persist file: {0}")]
    Persist(#[source] ServiceError),

    /// The tab was closed while the call was in flight
    #[error("Tab was closed before the operation completed")]
    Cancelled,
}
