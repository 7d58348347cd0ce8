use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::process;
use glob::glob;
use log::{debug, warn};
use crate::manager_storage::errors::StoreError;
use crate::manager_storage::ObjectStore;

/// Object store backed by a local directory, buckets are sub directories and keys are
/// relative paths within them.
///
/// Objects are written to a temporary sibling and then renamed into place, so a reader
/// never sees a partially written object.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Returns a new instance of the FileStore struct
    ///
    /// # Arguments
    ///
    /// * 'root' - directory holding one sub directory per bucket
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Removes temporary objects left behind by interrupted writes in a bucket
    ///
    /// # Arguments
    ///
    /// * 'bucket' - the bucket to clean up
    pub fn purge_stale(&self, bucket: &str) -> Result<usize, StoreError> {
        let bucket_dir = self.root.join(bucket);
        let pattern = format!("{}/**/.*.tmp", glob::Pattern::escape(&bucket_dir.to_string_lossy()));

        let mut removed = 0;
        for entry in glob(&pattern)? {
            if let Ok(path) = entry {
                warn!("removing stale temporary object {}", path.display());
                fs::remove_file(path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let plain = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if bucket.is_empty() || bucket.contains(['/', '\\']) || !plain || key.is_empty() {
            return Err(StoreError::InvalidKey(format!("{}/{}", bucket, key)));
        }

        Ok(self.root.join(bucket).join(relative))
    }
}

impl ObjectStore for FileStore {
    fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        debug!("reading {}", path.display());

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
            },
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        let parent = path.parent().ok_or(StoreError::InvalidKey(key.to_string()))?;
        let file_name = path.file_name()
            .and_then(|f| f.to_str())
            .ok_or(StoreError::InvalidKey(key.to_string()))?;

        fs::create_dir_all(parent)?;

        let tmp_path = parent.join(format!(".{}.{}.tmp", file_name, process::id()));
        debug!("writing {} via {}", path.display(), tmp_path.display());

        fs::write(&tmp_path, bytes)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_fetch_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.store("dest", "predictions/result.csv", b"first").unwrap();
        store.store("dest", "predictions/result.csv", b"second").unwrap();

        assert_eq!(store.fetch("dest", "predictions/result.csv").unwrap(), b"second");
        assert_eq!(fs::read_dir(dir.path().join("dest/predictions")).unwrap().count(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let res = store.fetch("intake", "nope.csv");

        assert!(matches!(res, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn keys_may_not_escape_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.fetch("intake", "../secret"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.store("intake", "/etc/passwd", b"x"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.fetch("", "a.csv"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn purges_leftover_temporary_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.store("dest", "predictions/result.csv", b"ok").unwrap();
        fs::write(dir.path().join("dest/predictions/.result.csv.999.tmp"), b"partial").unwrap();

        assert_eq!(store.purge_stale("dest").unwrap(), 1);
        assert_eq!(store.fetch("dest", "predictions/result.csv").unwrap(), b"ok");
    }
}
