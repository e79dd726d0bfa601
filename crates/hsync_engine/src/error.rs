//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The server rejected the shared key.
    #[error("unauthorized: check the shared key")]
    Unauthorized,

    /// The server answered with an unexpected status.
    #[error("server returned {status}: {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Protocol error (invalid message format or document name).
    #[error("protocol error: {0}")]
    Protocol(#[from] hsync_protocol::ProtocolError),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if the next tick may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::ServerError { status, .. } => *status >= 500,
            SyncError::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection refused").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::ServerError {
            status: 500,
            message: "write failed".into()
        }
        .is_retryable());
        assert!(!SyncError::ServerError {
            status: 413,
            message: "payload too large".into()
        }
        .is_retryable());
        assert!(!SyncError::Unauthorized.is_retryable());
        assert!(!SyncError::Config("bad interval".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::ServerError {
            status: 404,
            message: "not found".into(),
        };
        assert_eq!(err.to_string(), "server returned 404: not found");
        assert!(SyncError::Unauthorized.to_string().contains("shared key"));
    }
}
