//! Storage backends for the record table
//!
//! The record store only sees [`DocumentStorage`]; which backend sits behind it is
//! decided by the host (file on native, LocalStorage in the browser, memory in tests).

use thiserror::Error;

/// Failure reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A place where one UTF-8 document can be read and written
pub trait DocumentStorage {
    /// Read the stored document, `Ok(None)` if nothing has been written yet
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored document
    fn write(&mut self, contents: &str) -> Result<(), StorageError>;
}

/// In-memory storage, used by tests and as a fallback when no data dir exists
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing document
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail (simulates a read-only disk)
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DocumentStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.contents = Some(contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};

    use super::{DocumentStorage, StorageError};

    /// JSON document on the local filesystem
    #[derive(Debug, Clone)]
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        pub(super) fn tmp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone().into_os_string();
            tmp.push(".tmp");
            PathBuf::from(tmp)
        }
    }

    impl DocumentStorage for FileStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            match fs::read_to_string(&self.path) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        fn write(&mut self, contents: &str) -> Result<(), StorageError> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            // Write to a sibling temp file first so a crash never leaves half a document
            let tmp = self.tmp_path();
            fs::write(&tmp, contents)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{DocumentStorage, StorageError};

    /// Browser LocalStorage entry
    #[derive(Debug, Clone)]
    pub struct LocalStorage {
        key: String,
    }

    impl LocalStorage {
        pub fn new(key: impl Into<String>) -> Self {
            Self { key: key.into() }
        }

        fn storage() -> Result<web_sys::Storage, StorageError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| StorageError::Unavailable("no LocalStorage".to_string()))
        }
    }

    impl DocumentStorage for LocalStorage {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Self::storage()?
                .get_item(&self.key)
                .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
        }

        fn write(&mut self, contents: &str) -> Result<(), StorageError> {
            Self::storage()?
                .set_item(&self.key, contents)
                .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_starts_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_write_failure() {
        let mut storage = MemoryStorage::with_contents("{}");
        storage.set_fail_writes(true);
        assert!(matches!(
            storage.write("x"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.contents(), Some("{}"));
        assert_eq!(storage.writes(), 0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_missing_then_written() {
        let dir = std::env::temp_dir().join(format!(
            "memory-games-storage-{}",
            std::process::id()
        ));
        let path = dir.join("nested").join("records.json");
        let _ = std::fs::remove_dir_all(&dir);

        let mut storage = FileStorage::new(&path);
        assert!(storage.read().unwrap().is_none());

        storage.write("{\"a\": 1}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{\"a\": 1}"));
        assert!(!storage.tmp_path().exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
