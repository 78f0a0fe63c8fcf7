//! Throwaway directories for filesystem adapter tests.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct ScratchDir(PathBuf);

impl ScratchDir {
    pub fn new() -> Self {
        let path = env::temp_dir().join(format!("framer-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        fs::remove_dir_all(&self.0).ok();
    }
}
