//! Shared-secret authentication.
//!
//! Every replica presents the same key. Keys are compared as SHA-256
//! digests in constant time, so the comparison time reveals neither the
//! key's length nor the length of a matching prefix.

use crate::error::{ServerError, ServerResult};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Validates the key presented with a request.
#[derive(Clone)]
pub struct KeyValidator {
    expected: [u8; 32],
}

impl KeyValidator {
    /// Creates a validator for the given shared secret.
    pub fn new(key: &str) -> Self {
        Self {
            expected: Self::digest(key),
        }
    }

    /// Checks a presented key.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AuthenticationFailed`] if the key is missing or
    /// does not match.
    pub fn validate(&self, presented: Option<&str>) -> ServerResult<()> {
        let presented =
            presented.ok_or_else(|| ServerError::AuthenticationFailed("missing key".into()))?;

        if bool::from(Self::digest(presented)[..].ct_eq(&self.expected[..])) {
            Ok(())
        } else {
            Err(ServerError::AuthenticationFailed("key mismatch".into()))
        }
    }

    fn digest(key: &str) -> [u8; 32] {
        Sha256::digest(key.as_bytes()).into()
    }
}

impl std::fmt::Debug for KeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_key() {
        let validator = KeyValidator::new("default-secret");
        assert!(validator.validate(Some("default-secret")).is_ok());
    }

    #[test]
    fn rejects_wrong_key() {
        let validator = KeyValidator::new("default-secret");
        let err = validator.validate(Some("default-secreT")).unwrap_err();
        assert!(matches!(err, ServerError::AuthenticationFailed(_)));
        assert!(validator.validate(Some("")).is_err());
    }

    #[test]
    fn rejects_missing_key() {
        let validator = KeyValidator::new("default-secret");
        assert!(matches!(
            validator.validate(None),
            Err(ServerError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let validator = KeyValidator::new("super-secret");
        assert!(!format!("{validator:?}").contains("super-secret"));
    }
}
