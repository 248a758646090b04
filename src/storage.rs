use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;

use crate::error::StorageError;

/// StoredFile
///
/// The durable result of an upload: the final filename on disk and the
/// relative, publicly servable path persisted in database records.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub filename: String,
    pub path: String,
}

/// StorageService
///
/// Abstract contract for the upload storage layer. The concrete
/// implementation is swappable: [`LocalStorage`] writes beneath the public
/// directory in production, [`MockStorageService`] stands in during tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes uploaded bytes under the given public subdirectory
    /// ("uploads" for videos, "uploadGallery" for gallery images), deriving
    /// a collision-free filename from the original one.
    async fn save(
        &self,
        dir: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError>;

    /// Removes a previously stored file, addressed by the relative path a
    /// database record carries (e.g. "/uploadGallery/123-pic.jpg").
    async fn remove(&self, rel_path: &str) -> Result<(), StorageError>;
}

/// StorageState
///
/// The shared handle placed in the application state.
pub type StorageState = Arc<dyn StorageService>;

/// Strips directory navigation from a client-supplied filename and replaces
/// whitespace, leaving a single safe path segment. Rejects names with no
/// usable characters.
fn sanitize_filename(name: &str) -> Result<String, StorageError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    if base.is_empty() || base == "." || base == ".." {
        return Err(StorageError::InvalidFilename(name.to_string()));
    }
    Ok(base)
}

/// LocalStorage
///
/// Filesystem implementation writing into the publicly servable directory.
/// Filenames are prefixed with a millisecond timestamp to avoid collisions;
/// records store the resulting relative path.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, rel_path: &str) -> Result<PathBuf, StorageError> {
        // Paths come from our own records, but a traversal guard is still
        // applied before touching the filesystem.
        let trimmed = rel_path.trim_start_matches('/');
        if Path::new(trimmed)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(StorageError::InvalidFilename(rel_path.to_string()));
        }
        Ok(self.root.join(trimmed))
    }
}

#[async_trait]
impl StorageService for LocalStorage {
    async fn save(
        &self,
        dir: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        let safe_name = sanitize_filename(original_name)?;
        let filename = format!("{}-{}", Utc::now().timestamp_millis(), safe_name);

        let target_dir = self.root.join(dir);
        fs::create_dir_all(&target_dir).await?;
        fs::write(target_dir.join(&filename), bytes).await?;

        Ok(StoredFile {
            path: format!("/{}/{}", dir, filename),
            filename,
        })
    }

    async fn remove(&self, rel_path: &str) -> Result<(), StorageError> {
        let full = self.resolve(rel_path)?;
        fs::remove_file(full).await?;
        Ok(())
    }
}

/// MockStorageService
///
/// Test double recording saved files in memory. Failure modes are
/// switchable so handlers' partial-failure behavior (gallery delete keeps
/// going when the unlink fails) can be exercised without a filesystem.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub fail_save: bool,
    pub fail_remove: bool,
    saved: Arc<Mutex<Vec<StoredFile>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            fail_save: true,
            fail_remove: true,
            ..Self::default()
        }
    }

    /// Saves succeed but removals fail, mimicking a record whose backing
    /// file has already disappeared.
    pub fn failing_removal() -> Self {
        Self {
            fail_remove: true,
            ..Self::default()
        }
    }

    pub fn saved_paths(&self) -> Vec<String> {
        self.saved
            .lock()
            .expect("mock storage lock poisoned")
            .iter()
            .map(|f| f.path.clone())
            .collect()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn save(
        &self,
        dir: &str,
        original_name: &str,
        _bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        if self.fail_save {
            return Err(StorageError::Io(std::io::Error::other(
                "mock storage save failure",
            )));
        }
        let safe_name = sanitize_filename(original_name)?;
        let stored = StoredFile {
            path: format!("/{}/{}-{}", dir, Utc::now().timestamp_millis(), safe_name),
            filename: format!("{}-{}", Utc::now().timestamp_millis(), safe_name),
        };
        self.saved
            .lock()
            .expect("mock storage lock poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn remove(&self, rel_path: &str) -> Result<(), StorageError> {
        if self.fail_remove {
            return Err(StorageError::Io(std::io::Error::other(
                "mock storage remove failure",
            )));
        }
        self.saved
            .lock()
            .expect("mock storage lock poisoned")
            .retain(|f| f.path != rel_path);
        Ok(())
    }
}
