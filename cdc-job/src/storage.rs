//! Object storage used by the job to read inputs and persist snapshots.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{JobError, JobResult};
use crate::location::StorageLocation;

/// Trait for stores that hold the job's input objects and snapshots.
///
/// [`ObjectStore::put`] must be atomic: readers see either the previous object
/// or the complete new one, never a partial write.
pub trait ObjectStore {
    /// Returns the contents of an object, or [`None`] if it does not exist.
    fn get(&self, location: &StorageLocation) -> JobResult<Option<Vec<u8>>>;

    /// Creates or fully replaces an object.
    fn put(&self, location: &StorageLocation, contents: &[u8]) -> JobResult<()>;

    /// Returns true if the object exists.
    fn exists(&self, location: &StorageLocation) -> JobResult<bool> {
        Ok(self.get(location)?.is_some())
    }
}

/// Filesystem-backed object store.
///
/// Buckets are directories under `root` and keys are relative paths inside
/// them. Writes go to a uniquely named sibling temporary file that is renamed
/// over the target.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the filesystem path of an object.
    ///
    /// Buckets must be a single directory name and keys must stay inside
    /// their bucket; anything that could resolve outside `root` is rejected.
    pub fn path_of(&self, location: &StorageLocation) -> JobResult<PathBuf> {
        let bucket = Path::new(&location.bucket);
        let mut bucket_components = bucket.components();
        if !matches!(
            (bucket_components.next(), bucket_components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(JobError::InvalidLocation(format!(
                "bucket `{}` must be a single directory name",
                location.bucket
            )));
        }

        let key = Path::new(&location.key);
        let escapes = key
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(JobError::InvalidLocation(format!(
                "key `{}` must be a relative path inside its bucket",
                location.key
            )));
        }

        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for LocalObjectStore {
    fn get(&self, location: &StorageLocation) -> JobResult<Option<Vec<u8>>> {
        let path = self.path_of(location)?;
        match fs::read(&path) {
            Ok(contents) => {
                debug!(%location, bytes = contents.len(), "object read");
                Ok(Some(contents))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(JobError::io(path, err)),
        }
    }

    fn put(&self, location: &StorageLocation, contents: &[u8]) -> JobResult<()> {
        let path = self.path_of(location)?;
        let parent = path
            .parent()
            .ok_or_else(|| JobError::InvalidLocation(format!("`{location}` has no parent")))?;
        fs::create_dir_all(parent).map_err(|err| JobError::io(parent, err))?;

        // Unique per writer.
        let mut temp = NamedTempFile::new_in(parent).map_err(|err| JobError::io(parent, err))?;
        temp.write_all(contents)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|err| JobError::io(temp.path(), err))?;
        temp.persist(&path)
            .map_err(|err| JobError::io(&path, err.error))?;

        debug!(%location, bytes = contents.len(), "object written");

        Ok(())
    }
}

/// In-memory object store for tests and local experiments.
///
/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<StorageLocation, Vec<u8>>>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the locations of all stored objects.
    pub fn locations(&self) -> Vec<StorageLocation> {
        let objects = self.objects.lock().unwrap_or_else(|p| p.into_inner());
        objects.keys().cloned().collect()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, location: &StorageLocation) -> JobResult<Option<Vec<u8>>> {
        let objects = self.objects.lock().unwrap_or_else(|p| p.into_inner());
        Ok(objects.get(location).cloned())
    }

    fn put(&self, location: &StorageLocation, contents: &[u8]) -> JobResult<()> {
        let mut objects = self.objects.lock().unwrap_or_else(|p| p.into_inner());
        objects.insert(location.clone(), contents.to_vec());
        Ok(())
    }
}
