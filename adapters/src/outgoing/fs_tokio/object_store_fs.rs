use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use domain::object_key::ObjectKey;
use framer_application::{
    error::{AppError, AppResult},
    ports::outgoing::object_store::ObjectStorePort,
};

#[derive(Debug, Clone)]
pub struct FsObjectStoreConfig {
    pub root_dir: PathBuf,
}

/// Object store laid out as one file per key under a root directory.
///
/// Writes land in a dot-prefixed temp file first and are renamed into place, so a
/// reader never sees a partially written object and listings skip in-flight uploads.
pub struct FsObjectStoreAdapter {
    root_dir: PathBuf,
}

fn storage_error(action: &str, key: &ObjectKey, e: &io::Error) -> AppError {
    AppError::StorageError {
        message: format!("Failed to {action} object {key}: {e}"),
    }
}

impl FsObjectStoreAdapter {
    pub fn new(config: FsObjectStoreConfig) -> Self {
        Self {
            root_dir: config.root_dir,
        }
    }

    fn path_of(&self, key: &ObjectKey) -> PathBuf {
        self.root_dir.join(key.as_str())
    }

    fn temp_path_of(&self, key: &ObjectKey) -> PathBuf {
        self.root_dir.join(format!(".{key}.tmp"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

#[async_trait::async_trait]
impl ObjectStorePort for FsObjectStoreAdapter {
    #[instrument(skip(self, bytes), fields(%key, bytes = bytes.len()))]
    async fn upload(&self, key: &ObjectKey, bytes: &[u8]) -> AppResult<()> {
        fs::create_dir_all(&self.root_dir)
            .await
            .map_err(|e| storage_error("prepare directory for", key, &e))?;

        let temp = self.temp_path_of(key);
        fs::write(&temp, bytes)
            .await
            .map_err(|e| storage_error("write", key, &e))?;

        if let Err(e) = fs::rename(&temp, self.path_of(key)).await {
            fs::remove_file(&temp).await.ok();
            return Err(storage_error("commit", key, &e));
        }

        debug!("Stored object");
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> AppResult<Option<Vec<u8>>> {
        match fs::read(self.path_of(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", key, &e)),
        }
    }

    async fn list(&self) -> AppResult<Vec<ObjectKey>> {
        let listing_error = |e: &io::Error| AppError::StorageError {
            message: format!("Failed to list {}: {e}", self.root_dir.display()),
        };

        let mut entries = match fs::read_dir(&self.root_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(listing_error(&e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| listing_error(&e))? {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| listing_error(&e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(key) = entry
                .file_name()
                .to_str()
                .and_then(|name| ObjectKey::parse(name).ok())
            {
                keys.push(key);
            }
        }

        keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(keys)
    }

    #[instrument(skip(self), fields(%key))]
    async fn delete(&self, key: &ObjectKey) -> AppResult<()> {
        match fs::remove_file(self.path_of(key)).await {
            Ok(()) => {
                debug!("Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Object already absent");
                Ok(())
            }
            Err(e) => Err(storage_error("delete", key, &e)),
        }
    }
}
