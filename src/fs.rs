//! File system access used by plugins for manifest inspection

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Trait for reading and writing project files
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a UTF-8 file to a string
    async fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Write a string to a file, replacing its contents
    async fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> io::Result<()>;

    /// Whether the file exists and is accessible
    async fn file_exists(&self, path: &Path) -> bool;
}

/// File system backed by `tokio::fs`
#[derive(Debug, Default, Clone)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn read_file(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        tokio::fs::write(path, content).await
    }

    async fn delete_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}
