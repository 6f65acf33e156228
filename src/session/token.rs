//! Sources of the current session token.
//!
//! The binding only ever asks "what is the token right now?". Empty and
//! whitespace-only tokens are reported as absent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

/// Read access to the persisted session token. Called once per poll tick from
/// the session loop, so implementations must not block the runtime.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn current_token(&self) -> Option<String>;
}

pub(crate) fn normalize(token: Option<String>) -> Option<String> {
    token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// In-process token store shared between the host and the session binding.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

#[async_trait]
impl TokenSource for MemoryTokenStore {
    async fn current_token(&self) -> Option<String> {
        normalize(self.inner.read().clone())
    }
}

/// Token persisted as the sole contents of a file. A missing file means logged out.
///
/// Reads go through `tokio::fs`, which runs them on the blocking pool.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenSource for FileTokenStore {
    async fn current_token(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => normalize(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read session token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_normalizes_blank_tokens() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.current_token().await, None);
        store.set("  ");
        assert_eq!(store.current_token().await, None);
        store.set(" abc\n");
        assert_eq!(store.current_token().await, Some("abc".to_string()));
        store.clear();
        assert_eq!(store.current_token().await, None);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let host = MemoryTokenStore::new();
        let binding = host.clone();
        host.set("t1");
        assert_eq!(binding.current_token().await.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token"));
        assert_eq!(store.current_token().await, None);
        std::fs::write(store.path(), "secret\n").unwrap();
        assert_eq!(store.current_token().await.as_deref(), Some("secret"));
        std::fs::write(store.path(), "").unwrap();
        assert_eq!(store.current_token().await, None);
    }

    #[tokio::test]
    async fn test_file_store_unreadable_path_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let store = FileTokenStore::new(dir.path());
        assert_eq!(store.current_token().await, None);
    }
}
