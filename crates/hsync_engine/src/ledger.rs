//! Per-replica record of the last content confirmed with the server.

use std::collections::HashMap;

/// The base ledger of one replica.
///
/// For each document it holds the content this replica last saw agree with
/// the authoritative copy. A document with no entry has never been
/// confirmed and is pushed with an empty base.
pub trait BaseLedger: Send {
    /// Returns the recorded base for `name`.
    fn get(&self, name: &str) -> Option<String>;

    /// Records `content` as the base for `name`.
    fn set(&mut self, name: &str, content: String);
}

/// A [`BaseLedger`] kept in memory.
///
/// Entries are lost when the process exits. After a restart every local
/// document looks new until it is confirmed again.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    bases: HashMap<String, String>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded documents.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Recorded document names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bases.keys().cloned().collect();
        names.sort();
        names
    }
}

impl BaseLedger for MemoryLedger {
    fn get(&self, name: &str) -> Option<String> {
        self.bases.get(name).cloned()
    }

    fn set(&mut self, name: &str, content: String) {
        self.bases.insert(name.to_string(), content);
    }
}
