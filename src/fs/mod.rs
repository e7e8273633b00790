//! File system abstraction
//!
//! Session persistence goes through [`FileSystemOperations`] so it can be
//! exercised in tests with `MockFileSystemOperations` instead of touching
//! the disk.

use anyhow::Result;
use std::path::Path;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Write data to a file, creating the file if it doesn't exist
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Read a whole file as UTF-8
    async fn read_to_string(&self, path: &str) -> Result<String>;

    /// Remove a file; missing files are not an error
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool;
}

/// Production implementation backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &str) -> Result<()> {
        tokio::fs::create_dir_all(path).await.map_err(Into::into)
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        tokio::fs::write(path, contents).await.map_err(Into::into)
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(path).await.map_err(Into::into)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}
