//! Error types for the sync server.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised by document backends and stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The name cannot be mapped to a document file.
    #[error("invalid document name: {0}")]
    InvalidName(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// A document in the request exceeds the configured limit.
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge {
        /// Size of the offending field.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The store failed; nothing was reported as synced.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error outside the store (binding, serving).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::AuthenticationFailed(_)
                | ServerError::NotFound(_)
                | ServerError::PayloadTooLarge { .. }
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::Storage(_) | ServerError::Internal(_) | ServerError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::InvalidRequest("bad".into()).is_client_error());
        assert!(ServerError::AuthenticationFailed("key".into()).is_client_error());
        assert!(ServerError::Internal("oops".into()).is_server_error());
        assert!(!ServerError::InvalidRequest("bad".into()).is_server_error());

        let storage = ServerError::from(StoreError::Io(std::io::Error::other("disk full")));
        assert!(storage.is_server_error());
        assert!(!storage.is_client_error());
    }

    #[test]
    fn error_display() {
        let err = ServerError::PayloadTooLarge {
            size: 2048,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }
}
