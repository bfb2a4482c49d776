//! Local filesystem backend.

use std::fs;
use std::path::PathBuf;

use motif_core::{Error, Result};
use tracing::{debug, info};

use crate::{StoragePath, Storage};

/// Storage backed by `std::fs`
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn resolve(path: &StoragePath) -> Result<PathBuf> {
        path.local_path()
            .ok_or_else(|| Error::UnsupportedScheme(path.to_string()))
    }

    fn ensure_parent(path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    fn write(&self, path: &StoragePath, contents: &[u8]) -> Result<()> {
        let target = Self::resolve(path)?;
        Self::ensure_parent(&target)?;
        fs::write(&target, contents)?;
        debug!(path = %path, bytes = contents.len(), "Wrote storage object");
        Ok(())
    }

    fn read(&self, path: &StoragePath) -> Result<Vec<u8>> {
        Ok(fs::read(Self::resolve(path)?)?)
    }

    fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<()> {
        let source = Self::resolve(from)?;
        let target = Self::resolve(to)?;
        Self::ensure_parent(&target)?;
        fs::rename(&source, &target)?;
        info!(from = %from, to = %to, "Relocated storage object");
        Ok(())
    }

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        Ok(Self::resolve(path)?.exists())
    }

    fn delete(&self, path: &StoragePath) -> Result<()> {
        let target = Self::resolve(path)?;
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else {
            fs::remove_file(&target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn at(dir: &std::path::Path, name: &str) -> StoragePath {
        StoragePath::parse(dir.join(name).to_string_lossy().into_owned())
    }

    #[test]
    fn test_write_creates_parents() {
        let temp = tempdir().unwrap();
        let storage = LocalStorage::new();
        let path = at(temp.path(), "nested/dir/out.txt");

        storage.write(&path, b"1 2 3\n").unwrap();
        assert_eq!(storage.read(&path).unwrap(), b"1 2 3\n");
    }

    #[test]
    fn test_rename_moves_object() {
        let temp = tempdir().unwrap();
        let storage = LocalStorage::new();
        let from = at(temp.path(), "a");
        let to = at(temp.path(), "moved/b");

        storage.write(&from, b"x").unwrap();
        storage.rename(&from, &to).unwrap();

        assert!(!storage.exists(&from).unwrap());
        assert_eq!(storage.read(&to).unwrap(), b"x");
    }

    #[test]
    fn test_missing_source_surfaces_io_error() {
        let temp = tempdir().unwrap();
        let storage = LocalStorage::new();

        let err = storage
            .rename(&at(temp.path(), "absent"), &at(temp.path(), "b"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_rejects_distributed_path() {
        let err = LocalStorage
            .write(&StoragePath::parse("hdfs://nn/out"), b"")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)));
    }

    #[test]
    fn test_delete() {
        let temp = tempdir().unwrap();
        let storage = LocalStorage::new();
        let path = at(temp.path(), "gone");

        storage.write(&path, b"x").unwrap();
        storage.delete(&path).unwrap();
        assert!(!storage.exists(&path).unwrap());
    }
}
