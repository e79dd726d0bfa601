//! Server configuration.

use hsync_protocol::{DEFAULT_KEY, DEFAULT_SUFFIX};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default limit on a single document in a request (10 MiB).
const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Directory holding one file per document.
    pub data_dir: PathBuf,
    /// Shared secret every request must present.
    pub auth_key: String,
    /// Suffix of tracked documents.
    pub document_suffix: String,
    /// Maximum size of `base` or `latest` in a reconcile request.
    pub max_document_bytes: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr,
            data_dir: data_dir.into(),
            auth_key: DEFAULT_KEY.to_string(),
            document_suffix: DEFAULT_SUFFIX.to_string(),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    /// Sets the shared secret.
    pub fn with_auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = key.into();
        self
    }

    /// Sets the tracked document suffix.
    pub fn with_document_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.document_suffix = suffix.into();
        self
    }

    /// Sets the per-document size limit.
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// Body limit for the HTTP layer: two documents plus JSON framing.
    pub fn max_body_bytes(&self) -> usize {
        self.max_document_bytes
            .saturating_mul(2)
            .saturating_add(64 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8080)), "data")
    }
}
