//! The replica's local documents.

use crate::error::SyncResult;
use hsync_protocol::{is_valid_document_name, validate_document_name, DEFAULT_SUFFIX};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Access to the documents a replica keeps locally.
///
/// An editor may change these at any time between calls.
pub trait LocalFiles: Send + Sync {
    /// Lists the names of tracked local documents.
    fn list(&self) -> SyncResult<Vec<String>>;

    /// Reads one document, `None` if it does not exist.
    fn read(&self, name: &str) -> SyncResult<Option<String>>;

    /// Creates or replaces one document.
    fn write(&self, name: &str, content: &str) -> SyncResult<()>;
}

/// Documents stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryFiles {
    root: PathBuf,
    suffix: String,
}

impl DirectoryFiles {
    /// Opens `root`, creating it if needed, tracking `.txt` files.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> SyncResult<Self> {
        Self::with_suffix(root, DEFAULT_SUFFIX)
    }

    /// Opens `root` tracking files with the given suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_suffix(root: &Path, suffix: &str) -> SyncResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            suffix: suffix.to_string(),
        })
    }

    /// Returns the directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> SyncResult<PathBuf> {
        validate_document_name(name, &self.suffix)?;
        Ok(self.root.join(name))
    }
}

impl LocalFiles for DirectoryFiles {
    fn list(&self) -> SyncResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_document_name(name, &self.suffix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> SyncResult<Option<String>> {
        match fs::read_to_string(self.path(name)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, content: &str) -> SyncResult<()> {
        fs::write(self.path(name)?, content)?;
        Ok(())
    }
}

/// Documents held in memory.
///
/// Clones share the same documents, so a test can play the editor while a
/// coordinator owns another handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    documents: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryFiles {
    /// Creates an empty set of documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every document.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.documents.lock().clone()
    }
}

impl LocalFiles for MemoryFiles {
    fn list(&self) -> SyncResult<Vec<String>> {
        Ok(self.documents.lock().keys().cloned().collect())
    }

    fn read(&self, name: &str) -> SyncResult<Option<String>> {
        Ok(self.documents.lock().get(name).cloned())
    }

    fn write(&self, name: &str, content: &str) -> SyncResult<()> {
        self.documents
            .lock()
            .insert(name.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use tempfile::tempdir;

    #[test]
    fn directory_roundtrip() {
        let dir = tempdir().unwrap();
        let files = DirectoryFiles::open(&dir.path().join("notes")).unwrap();
        assert!(files.root().is_dir());

        assert_eq!(files.read("note1.txt").unwrap(), None);
        files.write("note1.txt", "hello").unwrap();
        assert_eq!(files.read("note1.txt").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn directory_lists_tracked_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("settings.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("archive.txt")).unwrap();

        let files = DirectoryFiles::open(dir.path()).unwrap();
        assert_eq!(files.list().unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn directory_rejects_escaping_names() {
        let dir = tempdir().unwrap();
        let files = DirectoryFiles::open(dir.path()).unwrap();
        assert!(matches!(
            files.write("../escape.txt", "x"),
            Err(SyncError::Protocol(_))
        ));
    }

    #[test]
    fn memory_files_share_state() {
        let files = MemoryFiles::new();
        let editor = files.clone();
        editor.write("note1.txt", "typed").unwrap();
        assert_eq!(files.read("note1.txt").unwrap().as_deref(), Some("typed"));
        assert_eq!(files.list().unwrap(), vec!["note1.txt"]);
    }
}
