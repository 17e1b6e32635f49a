//! File storage configuration.
//!
//! Logos, avatars, and gallery images are written through the
//! [`scolara_core::FileStorage`] abstraction; the default backend stores
//! files on the local filesystem and serves them under a public URL prefix.

use std::env;
use std::path::PathBuf;

use scolara_core::LocalFileStorage;

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub public_url: String,
    pub max_file_size: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".to_string()),
            ),
            public_url: env::var("FILES_PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            max_file_size: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
        }
    }

    pub fn build(&self) -> LocalFileStorage {
        LocalFileStorage::with_max_size(
            self.upload_dir.clone(),
            self.public_url.clone(),
            self.max_file_size,
        )
    }
}
