//! The capability trait every object store implements.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RemoteError;

/// Operations the sync core needs from an object store.
///
/// Implementations must be shareable across worker tasks; the executor calls
/// `upload`, `redirect` and `delete` concurrently.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All object keys at or under `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RemoteError>;

    /// Write the content of `local` under `key`. Header resolution
    /// (content type, cache control, ...) belongs to the store.
    async fn upload(&self, local: &Path, key: &str) -> Result<(), RemoteError>;

    /// Create a zero-content object at `source_key` redirecting to `target`.
    async fn redirect(&self, source_key: &str, target: &str) -> Result<(), RemoteError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), RemoteError>;

    /// Request cache invalidation for `pattern`.
    async fn invalidate(&self, pattern: &str) -> Result<(), RemoteError>;
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RemoteError> {
        (**self).list(prefix).await
    }

    async fn upload(&self, local: &Path, key: &str) -> Result<(), RemoteError> {
        (**self).upload(local, key).await
    }

    async fn redirect(&self, source_key: &str, target: &str) -> Result<(), RemoteError> {
        (**self).redirect(source_key, target).await
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        (**self).delete(key).await
    }

    async fn invalidate(&self, pattern: &str) -> Result<(), RemoteError> {
        (**self).invalidate(pattern).await
    }
}
