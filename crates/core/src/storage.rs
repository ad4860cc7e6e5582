//! Photo file storage boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::eyre;
use uuid::Uuid;

use crate::errors::{MfcError, MfcResult};

/// Uploads larger than this are not attached.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// Storage prefix for branch photos.
pub const BRANCH_PHOTO_DIR: &str = "branches";

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores `bytes` under `destination` and returns the handle to persist.
    async fn store(&self, bytes: &[u8], destination: &str) -> MfcResult<String>;
    async fn delete(&self, handle: &str) -> MfcResult<()>;
    fn url(&self, handle: &str) -> String;
}

/// Reduces a client-supplied file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Destination for a new branch photo; unique so replacements never collide.
pub fn branch_photo_destination(file_name: &str) -> String {
    format!(
        "{BRANCH_PHOTO_DIR}/{}_{}",
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

/// Keeps files in memory. Handles are the destinations.
#[derive(Debug, Default)]
pub struct MemoryPhotoStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPhotoStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(handle))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoStorage for MemoryPhotoStorage {
    async fn store(&self, bytes: &[u8], destination: &str) -> MfcResult<String> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| MfcError::Database(eyre!("photo storage lock poisoned")))?;
        files.insert(destination.to_string(), bytes.to_vec());
        Ok(destination.to_string())
    }

    async fn delete(&self, handle: &str) -> MfcResult<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| MfcError::Database(eyre!("photo storage lock poisoned")))?;
        files.remove(handle);
        Ok(())
    }

    fn url(&self, handle: &str) -> String {
        format!("/media/{handle}")
    }
}
