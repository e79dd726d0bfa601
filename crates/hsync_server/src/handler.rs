//! Request handlers for sync operations.
//!
//! Handlers are transport-agnostic and blocking. The HTTP layer in
//! [`crate::http`] moves them onto the blocking pool; tests and in-process
//! transports call them directly.

use crate::auth::KeyValidator;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::ExclusiveStore;
use hsync_protocol::{validate_document_name, FingerprintMap, ReconcileRequest, ReconcileResponse};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handler for sync requests.
///
/// Every operation authenticates first and touches the store only if the
/// key matches.
pub struct RequestHandler {
    config: ServerConfig,
    validator: KeyValidator,
    store: Arc<dyn ExclusiveStore>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(config: ServerConfig, store: Arc<dyn ExclusiveStore>) -> Self {
        let validator = KeyValidator::new(&config.auth_key);
        Self {
            config,
            validator,
            store,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<dyn ExclusiveStore> {
        &self.store
    }

    /// Lists every document with its fingerprint.
    pub fn handle_list(&self, key: Option<&str>) -> ServerResult<FingerprintMap> {
        self.authenticate(key)?;

        let map = self.store.fingerprints()?;
        debug!(documents = map.len(), "listed fingerprints");
        Ok(map)
    }

    /// Returns one document's content.
    pub fn handle_fetch(&self, key: Option<&str>, name: &str) -> ServerResult<String> {
        self.authenticate(key)?;
        self.check_name(name)?;

        match self.store.read(name)? {
            Some(content) => Ok(content),
            None => Err(ServerError::NotFound(name.to_string())),
        }
    }

    /// Reconciles a replica's changes into the authoritative copy.
    ///
    /// The response carries the merged content, which is already durable
    /// when this returns.
    pub fn handle_reconcile(
        &self,
        key: Option<&str>,
        request: ReconcileRequest,
    ) -> ServerResult<ReconcileResponse> {
        self.authenticate(key)?;
        self.check_name(&request.filename)?;
        self.check_size(&request.base)?;
        self.check_size(&request.latest)?;

        let synced = self
            .store
            .reconcile_and_write(&request.filename, &request.base, &request.latest)
            .map_err(|e| {
                warn!(document = %request.filename, error = %e, "reconcile failed");
                ServerError::from(e)
            })?;

        info!(document = %request.filename, bytes = synced.len(), "document synced");
        Ok(ReconcileResponse::new(synced))
    }

    /// Checks the presented key without touching the store.
    pub fn authenticate(&self, key: Option<&str>) -> ServerResult<()> {
        self.validator.validate(key).inspect_err(|_| {
            warn!("rejected request with invalid key");
        })
    }

    fn check_name(&self, name: &str) -> ServerResult<()> {
        validate_document_name(name, &self.config.document_suffix)
            .map(|_| ())
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))
    }

    fn check_size(&self, content: &str) -> ServerResult<()> {
        let limit = self.config.max_document_bytes;
        if content.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: content.len(),
                limit,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("bind_addr", &self.config.bind_addr)
            .field("data_dir", &self.config.data_dir)
            .finish_non_exhaustive()
    }
}
