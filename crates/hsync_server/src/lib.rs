//! # hsync Server
//!
//! The authoritative replica: holds every tracked document and merges each
//! client push into it.
//!
//! This crate provides:
//! - Document backends (one file per document, or in memory)
//! - [`ExclusiveStore`]: enumerate, read, and reconcile-and-write
//! - Shared-secret authentication
//! - The `/sync` HTTP endpoint
//!
//! # Consistency
//!
//! [`SerializedStore`] runs every store operation under one lock, so
//! reconcile-and-write calls are totally ordered and each one merges against
//! the result of the previous one. That is the only guarantee: two clients
//! that pushed concurrently do not necessarily end up with identical text.
//!
//! ```rust
//! use hsync_server::{ExclusiveStore, InMemoryBackend, SerializedStore};
//!
//! let store = SerializedStore::new(InMemoryBackend::new());
//! let merged = store.reconcile_and_write("note1.txt", "", "hello").unwrap();
//! assert_eq!(merged, "hello");
//! assert_eq!(store.read("note1.txt").unwrap().as_deref(), Some("hello"));
//! ```
//!
//! # Authentication
//!
//! Every request carries the shared key in the `X-Sync-Key` header. A
//! mismatch is rejected before the store is touched.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod backend;
mod config;
mod error;
mod handler;
mod http;
mod server;
mod store;

pub use auth::KeyValidator;
pub use backend::{DocumentBackend, FileBackend, InMemoryBackend};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, StoreError, StoreResult};
pub use handler::RequestHandler;
pub use http::router;
pub use server::SyncServer;
pub use store::{ExclusiveStore, SerializedStore};
