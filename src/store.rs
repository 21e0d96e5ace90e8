//! Blob store abstraction.
//!
//! The [`BlobStore`] trait defines the storage operations the engines
//! need: whole-file upload, download as a string, download as an ordered
//! line list, and recursive prefix deletion. Backends are pluggable
//! (local filesystem [`LocalStore`], S3 [`S3Store`], in-memory
//! [`MemoryStore`]) and are injected into [`ProjectManager`] rather
//! than resolved from ambient state.
//!
//! The store is the single source of truth: no in-process cache is kept
//! across calls, so every batch, export, and tag update re-fetches the
//! files it needs.
//!
//! [`LocalStore`]: crate::store_fs::LocalStore
//! [`S3Store`]: crate::store_s3::S3Store
//! [`MemoryStore`]: crate::store_mem::MemoryStore
//! [`ProjectManager`]: crate::manager::ProjectManager

use async_trait::async_trait;

use crate::error::Result;

/// Abstract blob store keyed by `/`-separated relative paths.
///
/// Implementations must be `Send + Sync`; all operations are async and
/// every call is a potential suspension point.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` to `path`, replacing any existing object.
    ///
    /// An unconfirmed write is [`Error::Upload`](crate::error::Error::Upload).
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Read the object at `path` as a UTF-8 string.
    async fn download_string(&self, path: &str) -> Result<String>;

    /// Read the object at `path` as an ordered sequence of lines.
    ///
    /// Splits on any newline convention. The default implementation
    /// downloads the whole object and splits it in memory.
    async fn download_lines(&self, path: &str) -> Result<Vec<String>> {
        Ok(split_lines(&self.download_string(path).await?))
    }

    /// Recursively delete every object under `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;
}

/// Split text into lines on `\r\n`, `\r`, or `\n`.
///
/// Empty input yields no lines. A trailing newline yields a trailing
/// empty line, so writers in this crate join rows without one.
pub fn split_lines(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_all_newline_conventions() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_lines_empty_input_is_no_rows() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn split_lines_keeps_interior_blank_lines() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn split_lines_trailing_newline_yields_trailing_empty_line() {
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
    }
}
