use std::io::{self, ErrorKind};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use domain::object_key::FrameName;
use framer_application::{
    error::{AppError, AppResult},
    ports::outgoing::frame_assets::FrameAssetPort,
};

#[derive(Debug, Clone)]
pub struct FsFrameAssetConfig {
    pub directory: PathBuf,
}

/// Frame overlays read from a flat directory.
pub struct FsFrameAssetAdapter {
    directory: PathBuf,
}

impl FsFrameAssetAdapter {
    pub fn new(config: FsFrameAssetConfig) -> Self {
        Self {
            directory: config.directory,
        }
    }
}

fn storage_error(action: &str, e: &io::Error) -> AppError {
    AppError::StorageError {
        message: format!("Failed to {action}: {e}"),
    }
}

#[async_trait::async_trait]
impl FrameAssetPort for FsFrameAssetAdapter {
    async fn load(&self, name: &FrameName) -> AppResult<Option<Vec<u8>>> {
        let path = self.directory.join(name.as_str());
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!(frame = %name, bytes = bytes.len(), "Loaded frame asset");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&format!("read frame {name}"), &e)),
        }
    }

    async fn list(&self) -> AppResult<Vec<FrameName>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(directory = %self.directory.display(), "Frame directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(storage_error("list frame directory", &e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_error("list frame directory", &e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| storage_error("inspect frame asset", &e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|name| FrameName::parse(name).ok())
            {
                names.push(name);
            }
        }

        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outgoing::fs_tokio::scratch::ScratchDir;

    fn adapter(dir: &ScratchDir) -> FsFrameAssetAdapter {
        FsFrameAssetAdapter::new(FsFrameAssetConfig {
            directory: dir.path().to_path_buf(),
        })
    }

    #[tokio::test]
    async fn loads_existing_frame_and_misses_unknown() {
        let dir = ScratchDir::new();
        fs::write(dir.path().join("frame.png"), b"frame").await.unwrap();
        let adapter = adapter(&dir);

        let found = adapter.load(&FrameName::default()).await.unwrap();
        let missing = adapter
            .load(&FrameName::parse("gold.png").unwrap())
            .await
            .unwrap();

        assert_eq!(found.as_deref(), Some(&b"frame"[..]));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn lists_sorted_files_with_valid_names() {
        let dir = ScratchDir::new();
        for name in ["zebra.png", "alpha.png", ".hidden.png", "with space.png"] {
            fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        fs::create_dir(dir.path().join("nested")).await.unwrap();

        let names = adapter(&dir).list().await.unwrap();

        let names: Vec<&str> = names.iter().map(FrameName::as_str).collect();
        assert_eq!(names, vec!["alpha.png", "zebra.png"]);
    }

    #[tokio::test]
    async fn missing_directory_lists_nothing() {
        let dir = ScratchDir::new();
        let adapter = FsFrameAssetAdapter::new(FsFrameAssetConfig {
            directory: dir.path().join("absent"),
        });

        assert!(adapter.list().await.unwrap().is_empty());
    }
}
