//! A bucket backed by a local directory.
//!
//! ## Upload protocol
//!
//! 1. Read the local file and SHA-256 hash it.
//! 2. Resolve headers for the key from the [`ObjectPolicy`].
//! 3. Reject the key if a stored key is its ancestor or nests under it.
//! 4. Compare digest + headers with the index → skip if identical.
//! 5. Write the body to `<root>/<key>.bucketsync.tmp`.
//! 6. Rename to `<root>/<key>` (atomic on POSIX).
//! 7. Update the index record + save the index.
//!
//! Keys map onto paths, so unlike a real object store this bucket cannot
//! hold both `docs` and `docs/index.html`; step 3 reports that as
//! [`RemoteError::Rejected`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{io_err, RemoteError};
use crate::index::{self, Invalidation, ObjectIndex, ObjectRecord, INDEX_DIR};
use crate::policy::ObjectPolicy;
use crate::store::RemoteStore;

/// Object store rooted at a directory, with a JSON object index.
#[derive(Debug)]
pub struct DirBucket {
    root: PathBuf,
    policy: ObjectPolicy,
    index: Mutex<ObjectIndex>,
}

impl DirBucket {
    /// Open (creating if needed) the bucket at `root`.
    pub async fn open(root: impl Into<PathBuf>, policy: ObjectPolicy) -> Result<Self, RemoteError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| io_err(&root, e))?;
        let index = index::load_at(&root).await?;
        tracing::debug!(
            root = %root.display(),
            objects = index.objects.len(),
            "opened bucket"
        );
        Ok(Self {
            root,
            policy,
            index: Mutex::new(index),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index record for `key`, if stored.
    pub async fn record(&self, key: &str) -> Option<ObjectRecord> {
        self.index.lock().await.objects.get(key).cloned()
    }

    /// Every invalidation requested so far, oldest first.
    pub async fn invalidations(&self) -> Vec<Invalidation> {
        self.index.lock().await.invalidations.clone()
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, RemoteError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, segment| path.join(segment)))
    }

    async fn write_body(&self, path: &Path, body: &[u8]) -> Result<(), RemoteError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(parent, e))?;
        }
        let tmp = PathBuf::from(format!("{}.bucketsync.tmp", path.display()));
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(path, e));
        }
        Ok(())
    }

    /// A directory bucket cannot hold `docs` and `docs/index.html` at once.
    async fn check_conflict(&self, op: &'static str, key: &str) -> Result<(), RemoteError> {
        match self.index.lock().await.conflicting_key(key) {
            Some(other) => Err(RemoteError::Rejected {
                op,
                key: key.to_string(),
                reason: format!("conflicts with stored object '{other}'"),
            }),
            None => Ok(()),
        }
    }

    async fn put_record(&self, key: &str, record: ObjectRecord) -> Result<(), RemoteError> {
        let mut index = self.index.lock().await;
        index.objects.insert(key.to_string(), record);
        index::save_at(&self.root, &index).await
    }
}

#[async_trait]
impl RemoteStore for DirBucket {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, RemoteError> {
        Ok(self.index.lock().await.keys_with_prefix(prefix))
    }

    async fn upload(&self, local: &Path, key: &str) -> Result<(), RemoteError> {
        let path = self.object_path(key)?;
        let body = tokio::fs::read(local)
            .await
            .map_err(|e| io_err(local, e))?;
        let sha256 = digest(&body);
        let headers = self.policy.resolve(key);
        self.check_conflict("upload", key).await?;

        if let Some(stored) = self.index.lock().await.objects.get(key) {
            if stored.redirect.is_none() && stored.sha256 == sha256 && stored.headers == headers {
                tracing::debug!(key, "unchanged");
                return Ok(());
            }
        }

        self.write_body(&path, &body).await?;
        self.put_record(
            key,
            ObjectRecord {
                sha256,
                size: body.len() as u64,
                headers,
                redirect: None,
                modified_at: Utc::now(),
            },
        )
        .await?;
        tracing::debug!(key, local = %local.display(), "stored object");
        Ok(())
    }

    async fn redirect(&self, source_key: &str, target: &str) -> Result<(), RemoteError> {
        let path = self.object_path(source_key)?;
        self.check_conflict("redirect", source_key).await?;
        self.write_body(&path, &[]).await?;
        self.put_record(
            source_key,
            ObjectRecord {
                sha256: digest(&[]),
                size: 0,
                headers: self.policy.resolve(source_key),
                redirect: Some(target.to_string()),
                modified_at: Utc::now(),
            },
        )
        .await?;
        tracing::debug!(key = source_key, location = target, "stored redirect");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RemoteError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(&path, e)),
        }
        let mut index = self.index.lock().await;
        if index.objects.remove(key).is_some() {
            index::save_at(&self.root, &index).await?;
        }
        tracing::debug!(key, "deleted object");
        Ok(())
    }

    async fn invalidate(&self, pattern: &str) -> Result<(), RemoteError> {
        let mut index = self.index.lock().await;
        index.invalidations.push(Invalidation {
            pattern: pattern.to_string(),
            requested_at: Utc::now(),
        });
        index::save_at(&self.root, &index).await?;
        tracing::info!(pattern, "recorded cache invalidation");
        Ok(())
    }
}

fn digest(body: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(body);
    hex::encode(h.finalize())
}

/// Keys are `/`-separated, relative, and never reach into the index dir.
fn validate_key(key: &str) -> Result<(), RemoteError> {
    let invalid = key.is_empty()
        || key.contains('\\')
        || key.split('/').any(|s| s.is_empty() || s == "." || s == "..")
        || key.split('/').next() == Some(INDEX_DIR);
    if invalid {
        return Err(RemoteError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}
