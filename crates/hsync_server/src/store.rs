//! The authoritative document store.

use crate::backend::{DocumentBackend, FileBackend};
use crate::error::StoreResult;
use hsync_merge::{MergeEngine, MergePrimitive, TextPatcher};
use hsync_protocol::{fingerprint, FingerprintMap};
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, warn};

/// Exclusive-access store: the server side of the reconciliation protocol.
///
/// Implementations must linearize `reconcile_and_write`: concurrent calls are
/// totally ordered and each one merges against the content left by the
/// previous one. `fingerprints` and `read` never observe a partial write.
///
/// The provided [`SerializedStore`] uses one lock for all documents; an
/// implementation could lock per document without changing this contract.
pub trait ExclusiveStore: Send + Sync {
    /// Returns every tracked document with its fingerprint.
    fn fingerprints(&self) -> StoreResult<FingerprintMap>;

    /// Returns one document's content, `None` if it does not exist.
    fn read(&self, name: &str) -> StoreResult<Option<String>>;

    /// Merges `base -> incoming` into the current content and persists it.
    ///
    /// An absent document counts as empty and is created. Returns the merged
    /// content only once it is durable; on error nothing is reported as
    /// synced.
    fn reconcile_and_write(&self, name: &str, base: &str, incoming: &str) -> StoreResult<String>;
}

/// An [`ExclusiveStore`] serializing all operations behind a single lock.
///
/// Reconciling one document blocks reconciliation of every other document.
/// At the scale of a personal notes directory that costs nothing noticeable.
pub struct SerializedStore<B: DocumentBackend, P: MergePrimitive = TextPatcher> {
    backend: Mutex<B>,
    engine: MergeEngine<P>,
}

impl<B: DocumentBackend> SerializedStore<B, TextPatcher> {
    /// Creates a store over `backend` with the default merge engine.
    pub fn new(backend: B) -> Self {
        Self::with_engine(backend, MergeEngine::new())
    }
}

impl SerializedStore<FileBackend, TextPatcher> {
    /// Opens a store keeping one file per document under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_dir(root: &Path, suffix: &str) -> StoreResult<Self> {
        Ok(Self::new(FileBackend::with_suffix(root, suffix)?))
    }
}

impl<B: DocumentBackend, P: MergePrimitive> SerializedStore<B, P> {
    /// Creates a store with a custom merge engine.
    pub fn with_engine(backend: B, engine: MergeEngine<P>) -> Self {
        Self {
            backend: Mutex::new(backend),
            engine,
        }
    }

    /// Consumes the store and returns the backend.
    pub fn into_backend(self) -> B {
        self.backend.into_inner()
    }
}

impl<B: DocumentBackend, P: MergePrimitive> ExclusiveStore for SerializedStore<B, P> {
    fn fingerprints(&self) -> StoreResult<FingerprintMap> {
        let backend = self.backend.lock();
        let mut map = FingerprintMap::new();

        for name in backend.list()? {
            match backend.read(&name) {
                Ok(Some(content)) => {
                    map.insert(name, fingerprint(&content));
                }
                Ok(None) => {}
                Err(e) => warn!(document = %name, error = %e, "skipping unreadable document"),
            }
        }

        Ok(map)
    }

    fn read(&self, name: &str) -> StoreResult<Option<String>> {
        self.backend.lock().read(name)
    }

    fn reconcile_and_write(&self, name: &str, base: &str, incoming: &str) -> StoreResult<String> {
        let mut backend = self.backend.lock();

        let current = backend.read(name)?.unwrap_or_default();
        let merged = self.engine.three_way(base, incoming, &current);
        backend.write(name, &merged)?;

        debug!(
            document = %name,
            diverged = current != base,
            bytes = merged.len(),
            "reconciled document"
        );
        Ok(merged)
    }
}
