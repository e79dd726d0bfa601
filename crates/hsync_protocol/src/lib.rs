//! # hsync Protocol
//!
//! Wire types and shared rules for hsync.
//!
//! This crate provides:
//! - `ReconcileRequest` / `ReconcileResponse` for the push exchange
//! - `FingerprintMap` and [`fingerprint`] for cheap divergence checks
//! - [`validate_document_name`] for the naming rule both sides enforce
//! - Endpoint, header and default constants
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! ## Wire Protocol
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | list fingerprints | `GET /sync` | JSON `{name: fingerprint}` |
//! | fetch document | `GET /sync?filename=<name>` | plain text, `404` if absent |
//! | reconcile | `POST /sync` with [`ReconcileRequest`] | [`ReconcileResponse`] |
//!
//! Every request carries the shared secret in [`KEY_HEADER`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod fingerprint;
mod messages;
mod name;

pub use error::{ProtocolError, ProtocolResult};
pub use fingerprint::{fingerprint, FingerprintMap};
pub use messages::{FetchQuery, ReconcileRequest, ReconcileResponse};
pub use name::{is_valid_document_name, validate_document_name};

/// Path of the single sync endpoint.
pub const SYNC_PATH: &str = "/sync";

/// Header carrying the shared secret.
pub const KEY_HEADER: &str = "X-Sync-Key";

/// Suffix of tracked documents unless configured otherwise.
pub const DEFAULT_SUFFIX: &str = ".txt";

/// Shared secret used when none is configured.
pub const DEFAULT_KEY: &str = "default-secret";
