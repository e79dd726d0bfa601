//! Transport layer abstraction for sync operations.

use crate::error::SyncResult;
use hsync_protocol::{FingerprintMap, ReconcileRequest, ReconcileResponse};
use std::sync::Arc;

/// The three operations a replica performs against the server.
///
/// This trait abstracts the network layer so the coordinator can run over
/// HTTP or directly against an in-process server in tests.
pub trait SyncTransport: Send + Sync {
    /// Lists every document on the server with its fingerprint.
    fn list_fingerprints(&self) -> SyncResult<FingerprintMap>;

    /// Fetches one document, `None` if the server does not have it.
    fn fetch_document(&self, name: &str) -> SyncResult<Option<String>>;

    /// Sends local changes and returns the merged content the server now
    /// holds.
    fn reconcile(&self, request: &ReconcileRequest) -> SyncResult<ReconcileResponse>;
}

impl<T: SyncTransport + ?Sized> SyncTransport for Arc<T> {
    fn list_fingerprints(&self) -> SyncResult<FingerprintMap> {
        (**self).list_fingerprints()
    }

    fn fetch_document(&self, name: &str) -> SyncResult<Option<String>> {
        (**self).fetch_document(name)
    }

    fn reconcile(&self, request: &ReconcileRequest) -> SyncResult<ReconcileResponse> {
        (**self).reconcile(request)
    }
}
