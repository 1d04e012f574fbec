//! Dry-run wrapper: lists from the real store, logs every mutation instead
//! of performing it.

use std::path::Path;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::store::RemoteStore;

/// A [`RemoteStore`] that never changes the wrapped store.
#[derive(Debug)]
pub struct DryRunStore<S> {
    inner: S,
}

impl<S> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteStore for DryRunStore<S> {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RemoteError> {
        self.inner.list(prefix).await
    }

    async fn upload(&self, local: &Path, key: &str) -> Result<(), RemoteError> {
        tracing::info!("[dry-run] would upload {} to {key}", local.display());
        Ok(())
    }

    async fn redirect(&self, source_key: &str, target: &str) -> Result<(), RemoteError> {
        tracing::info!("[dry-run] would redirect {source_key} to {target}");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        tracing::info!("[dry-run] would delete {key}");
        Ok(())
    }

    async fn invalidate(&self, pattern: &str) -> Result<(), RemoteError> {
        tracing::info!("[dry-run] would invalidate {pattern}");
        Ok(())
    }
}
