//! Document backends.
//!
//! Backends are **unsynchronized** name-to-text stores. They know nothing
//! about merging or locking; [`crate::SerializedStore`] adds both.

use crate::error::{StoreError, StoreResult};
use hsync_protocol::{is_valid_document_name, DEFAULT_SUFFIX};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Raw access to the documents held by the authoritative replica.
///
/// # Invariants
///
/// - `read` after a successful `write` returns exactly the written text
/// - `write` returns only after the document is durable
/// - a failed `write` leaves the previous content in place
pub trait DocumentBackend: Send {
    /// Lists the names of all stored documents.
    fn list(&self) -> StoreResult<Vec<String>>;

    /// Reads one document, `None` if it does not exist.
    fn read(&self, name: &str) -> StoreResult<Option<String>>;

    /// Creates or replaces one document.
    fn write(&mut self, name: &str, content: &str) -> StoreResult<()>;
}

/// One file per document under a root directory.
///
/// ```text
/// <root>/
/// ├─ note1.txt
/// ├─ note2.txt
/// └─ .note2.txt.tmp    # only while a write is in flight
/// ```
///
/// Writes go to a hidden temporary sibling, are synced to disk, then renamed
/// over the target, so a crash leaves either the old or the new content. The
/// root directory is synced after the rename.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    suffix: String,
}

impl FileBackend {
    /// Opens a backend rooted at `root` tracking `.txt` documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StoreResult<Self> {
        Self::with_suffix(root, DEFAULT_SUFFIX)
    }

    /// Opens a backend tracking documents with the given suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `root` is not a
    /// directory.
    pub fn with_suffix(root: &Path, suffix: &str) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        if !root.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", root.display()),
            )));
        }

        Ok(Self {
            root: root.to_path_buf(),
            suffix: suffix.to_string(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, name: &str) -> StoreResult<PathBuf> {
        if !is_valid_document_name(name, &self.suffix) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{name}.tmp"))
    }

    /// Syncs the root directory so a completed rename survives a crash.
    #[cfg(unix)]
    fn sync_directory(&self) -> io::Result<()> {
        File::open(&self.root)?.sync_all()
    }

    /// NTFS journals metadata; directories cannot be synced on Windows.
    #[cfg(not(unix))]
    fn sync_directory(&self) -> io::Result<()> {
        Ok(())
    }
}

impl DocumentBackend for FileBackend {
    fn list(&self) -> StoreResult<Vec<String>> {
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

    fn read(&self, name: &str) -> StoreResult<Option<String>> {
        let path = self.document_path(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, name: &str, content: &str) -> StoreResult<()> {
        let path = self.document_path(name)?;
        let temp = self.temp_path(name);

        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp, &path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result?;

        self.sync_directory()?;
        Ok(())
    }
}

/// Documents held in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    documents: BTreeMap<String, String>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with documents.
    pub fn with_documents<I, K, V>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            documents: documents
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl DocumentBackend for InMemoryBackend {
    fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> StoreResult<Option<String>> {
        Ok(self.documents.get(name).cloned())
    }

    fn write(&mut self, name: &str, content: &str) -> StoreResult<()> {
        self.documents.insert(name.to_string(), content.to_string());
        Ok(())
    }
}
