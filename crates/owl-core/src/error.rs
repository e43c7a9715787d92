//! Error types for remote service calls

use thiserror::Error;

/// Failure reported by a remote service client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Transport(String),

    /// Message supplied by the server, shown to the user as-is
    #[error("{0}")]
    Server(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// The text to put in front of a user
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Server(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for remote service calls
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
