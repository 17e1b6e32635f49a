//! Storage backend abstraction for logos, avatars, and gallery images.
//!
//! The database write is the source of truth; storage cleanup is
//! best-effort and non-transactional. Callers log and ignore deletion
//! failures rather than rolling back a completed delete.

use std::fmt;
use std::path::PathBuf;
use tokio::fs;

/// Abstract trait for file storage backends.
///
/// Accepts a binary payload and returns a stable reference string; accepts a
/// reference string and removes the object. Implementations can be swapped
/// without changing handler logic.
pub trait FileStorage: Send + Sync {
    /// Save file content under `key` and return the storage key.
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>;

    /// Delete a file by key. Succeeds when the file is already gone.
    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>;

    /// Public URL for accessing a stored file.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

/// Error type for file storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File exceeds the maximum allowed size.
    InvalidFileSize { max_bytes: usize },

    /// MIME type not allowed.
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    /// I/O error.
    IoError(std::io::Error),

    /// Invalid storage key format.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "MIME type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// MIME types accepted for uploaded images.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// Validate an image upload's declared MIME type and size.
pub fn validate_image(mime_type: &str, size: usize, max_bytes: usize) -> Result<(), StorageError> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime_type) {
        return Err(StorageError::InvalidMimeType {
            received: mime_type.to_string(),
            allowed: ALLOWED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
        });
    }
    if size > max_bytes {
        return Err(StorageError::InvalidFileSize { max_bytes });
    }
    Ok(())
}

/// File extension for an accepted image MIME type.
pub fn image_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Local filesystem-based storage. Stores files under a base directory and
/// serves them via a configured public URL prefix.
#[derive(Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size: 5 * 1024 * 1024,
        }
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate storage key format to prevent path traversal.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);

            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }

            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(
        &'a self,
        key: &'a str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), StorageError>> + Send + 'a>>
    {
        Box::pin(async move {
            Self::validate_key(key)?;

            let file_path = self.base_dir.join(key);

            match fs::remove_file(&file_path).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalFileStorage::validate_key("schools/logo.png").is_ok());
        assert!(LocalFileStorage::validate_key("gallery/abc-123.jpg").is_ok());
        assert!(LocalFileStorage::validate_key("teachers/avatar_1.webp").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("").is_err());
    }

    #[test]
    fn test_get_url_handles_trailing_slash() {
        let storage = LocalFileStorage::new(
            PathBuf::from("./uploads"),
            "http://localhost:3000/files/".to_string(),
        );
        let url = storage.get_url("schools/logo.png").unwrap();
        assert_eq!(url, "http://localhost:3000/files/schools/logo.png");
    }

    #[test]
    fn test_validate_image_rejects_wrong_mime() {
        assert!(validate_image("image/png", 100, 1000).is_ok());
        assert!(validate_image("application/pdf", 100, 1000).is_err());
    }

    #[test]
    fn test_validate_image_rejects_oversize() {
        assert!(validate_image("image/jpeg", 2000, 1000).is_err());
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), "png");
        assert_eq!(image_extension("image/jpeg"), "jpg");
        assert_eq!(image_extension("image/webp"), "webp");
    }
}
