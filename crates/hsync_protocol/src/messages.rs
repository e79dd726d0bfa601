//! Protocol messages for sync.

use crate::error::ProtocolResult;
use serde::{Deserialize, Serialize};

/// Push request: the replica's base and its divergent local content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Document name.
    pub filename: String,
    /// Content the replica last confirmed with the server (`""` if never).
    pub base: String,
    /// The replica's current local content.
    pub latest: String,
}

impl ReconcileRequest {
    /// Creates a new reconcile request.
    pub fn new(
        filename: impl Into<String>,
        base: impl Into<String>,
        latest: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            base: base.into(),
            latest: latest.into(),
        }
    }

    /// Encodes to JSON.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes from JSON.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Push response carrying the merged content now held by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResponse {
    /// Merged content, durably written on the server.
    pub synced: String,
}

impl ReconcileResponse {
    /// Creates a new reconcile response.
    pub fn new(synced: impl Into<String>) -> Self {
        Self {
            synced: synced.into(),
        }
    }

    /// Encodes to JSON.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes from JSON.
    pub fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Query string of a `GET /sync` request.
///
/// Without `filename` the request lists fingerprints; with it, the request
/// fetches that one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Document to fetch.
    pub filename: Option<String>,
}
