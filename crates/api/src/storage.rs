//! Photo files on the local filesystem, served back under the media URL.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use eyre::{WrapErr, eyre};
use mfc_core::errors::{MfcError, MfcResult};
use mfc_core::storage::PhotoStorage;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalPhotoStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalPhotoStorage {
    /// `base_url` is the public prefix, e.g. `/media/`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a handle inside the root. Handles are relative paths made of
    /// plain components only.
    fn resolve(&self, handle: &str) -> MfcResult<PathBuf> {
        let relative = Path::new(handle);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if handle.is_empty() || !plain {
            return Err(MfcError::Database(eyre!("invalid photo handle {handle:?}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, bytes: &[u8], destination: &str) -> MfcResult<String> {
        let path = self.resolve(destination)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;

        debug!(path = %path.display(), size = bytes.len(), "photo stored");
        Ok(destination.to_string())
    }

    async fn delete(&self, handle: &str) -> MfcResult<()> {
        let path = self.resolve(handle)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "photo removed");
                Ok(())
            }
            // Already gone is as good as deleted.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MfcError::Database(
                eyre::Report::new(err).wrap_err(format!("failed to remove {}", path.display())),
            )),
        }
    }

    fn url(&self, handle: &str) -> String {
        format!("{}{handle}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_deletes_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path(), "/media");

        let handle = storage.store(b"jpeg", "branches/a_front.jpg").await.unwrap();
        assert_eq!(handle, "branches/a_front.jpg");
        assert_eq!(storage.url(&handle), "/media/branches/a_front.jpg");

        let path = dir.path().join("branches/a_front.jpg");
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");

        storage.delete(&handle).await.unwrap();
        assert!(!path.exists());
        // Deleting twice is fine.
        storage.delete(&handle).await.unwrap();
    }

    #[tokio::test]
    async fn handles_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalPhotoStorage::new(dir.path(), "/media/");

        assert!(storage.store(b"x", "../outside.jpg").await.is_err());
        assert!(storage.delete("/etc/passwd").await.is_err());
    }
}
