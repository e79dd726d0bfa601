//! # hsync Engine
//!
//! The replica side of hsync.
//!
//! This crate provides:
//! - [`SyncCoordinator`]: the pull-then-push loop
//! - [`BaseLedger`]: the per-replica record of confirmed content
//! - [`LocalFiles`]: the documents the replica edits
//! - [`SyncTransport`] and its HTTP implementation
//! - Client configuration loaded from TOML
//!
//! ## Architecture
//!
//! The engine implements a **pull-then-push** model:
//! 1. Pull: fast-forward every clean local document the server has changed
//! 2. Push: send every dirty document for a three-way merge on the server
//!
//! The server is authoritative. A replica never merges locally; it only
//! replaces its copy with the merged text the server returns.
//!
//! ```rust
//! use hsync_engine::{MemoryFiles, MemoryLedger, SyncCoordinator, SyncTransport, SyncResult};
//! use hsync_protocol::{FingerprintMap, ReconcileRequest, ReconcileResponse};
//!
//! struct Offline;
//!
//! impl SyncTransport for Offline {
//!     fn list_fingerprints(&self) -> SyncResult<FingerprintMap> {
//!         Ok(FingerprintMap::new())
//!     }
//!     fn fetch_document(&self, _name: &str) -> SyncResult<Option<String>> {
//!         Ok(None)
//!     }
//!     fn reconcile(&self, request: &ReconcileRequest) -> SyncResult<ReconcileResponse> {
//!         Ok(ReconcileResponse::new(request.latest.clone()))
//!     }
//! }
//!
//! let mut replica = SyncCoordinator::new(Offline, MemoryLedger::new(), MemoryFiles::new());
//! let report = replica.tick();
//! assert!(report.is_clean());
//! ```
//!
//! ## Key Invariants
//!
//! - Pull always happens before push
//! - A dirty local document is never overwritten by pull
//! - The base only advances to content known to be on the server and on disk

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod files;
mod http;
mod ledger;
mod transport;

pub use config::{
    default_config_path, default_notes_dir, parse_interval, SyncConfig, DEFAULT_INTERVAL,
    DEFAULT_SERVER_URL,
};
pub use coordinator::{SyncCoordinator, SyncState, SyncStats, TickReport};
pub use error::{SyncError, SyncResult};
pub use files::{DirectoryFiles, LocalFiles, MemoryFiles};
pub use http::HttpTransport;
pub use ledger::{BaseLedger, MemoryLedger};
pub use transport::SyncTransport;
