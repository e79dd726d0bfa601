//! Document naming rule.
//!
//! A document name is a bare file name inside the tracked directory: one
//! path component, no separators, ending with the tracked suffix. The server
//! uses it to keep writes inside its data directory; the client uses it to
//! ignore listings it could not store safely.

use crate::error::{ProtocolError, ProtocolResult};

/// Validates a document name against the tracked suffix.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidName`] if the name is empty, is `.` or
/// `..`, contains a path separator or NUL, or lacks the suffix.
pub fn validate_document_name<'a>(name: &'a str, suffix: &str) -> ProtocolResult<&'a str> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be a directory reference")
    } else if name.contains(['/', '\\', '\0']) {
        Some("must be a single path component")
    } else if !name.ends_with(suffix) || name.len() == suffix.len() {
        Some("missing tracked suffix")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ProtocolError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(name),
    }
}

/// Returns true if the name passes [`validate_document_name`].
pub fn is_valid_document_name(name: &str, suffix: &str) -> bool {
    validate_document_name(name, suffix).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_names() {
        assert!(is_valid_document_name("note1.txt", ".txt"));
        assert!(is_valid_document_name("buffer-2024.txt", ".txt"));
        assert!(is_valid_document_name("notes.md", ".md"));
    }

    #[test]
    fn rejects_traversal_and_separators() {
        assert!(!is_valid_document_name("../secret.txt", ".txt"));
        assert!(!is_valid_document_name("dir/note.txt", ".txt"));
        assert!(!is_valid_document_name("dir\\note.txt", ".txt"));
        assert!(!is_valid_document_name("..", ".txt"));
        assert!(!is_valid_document_name(".", ".txt"));
    }

    #[test]
    fn rejects_wrong_suffix() {
        assert!(!is_valid_document_name("note1.md", ".txt"));
        assert!(!is_valid_document_name("", ".txt"));
        assert!(!is_valid_document_name(".txt", ".txt"));
    }

    proptest! {
        #[test]
        fn names_with_separator_never_valid(prefix in "[a-z]{0,8}", rest in "[a-z]{0,8}") {
            let name = format!("{prefix}/{rest}.txt");
            prop_assert!(!is_valid_document_name(&name, ".txt"));
        }
    }
}
