//! Content fingerprints.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Mapping from document name to its content fingerprint.
///
/// Ordered so listings and their JSON encoding are deterministic.
pub type FingerprintMap = BTreeMap<String, String>;

/// Computes the fingerprint of a document's content.
///
/// The fingerprint is the lowercase hex SHA-256 of the UTF-8 bytes. Both
/// replicas must use this exact function, since a replica compares a
/// fingerprint it computes locally against one the server sent.
pub fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            fingerprint("hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn differs_on_change() {
        assert_ne!(fingerprint("hello"), fingerprint("hello world"));
    }
}
