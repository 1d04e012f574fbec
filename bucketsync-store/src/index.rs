//! Object index: the metadata side of a [`DirBucket`](crate::DirBucket).
//!
//! Persists an `ObjectIndex` JSON document at
//! `<root>/.bucketsync/index.json`: one record per stored key (body digest,
//! headers, redirect location) plus the invalidation log.
//! Writes use the atomic `.tmp` + rename pattern.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, RemoteError};
use crate::policy::ObjectHeaders;

/// Directory under the bucket root reserved for bucket metadata.
pub const INDEX_DIR: &str = ".bucketsync";

/// Everything known about one stored object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRecord {
    /// SHA-256 hex digest of the object body.
    pub sha256: String,
    pub size: u64,
    pub headers: ObjectHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub modified_at: DateTime<Utc>,
}

/// One recorded cache invalidation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invalidation {
    pub pattern: String,
    pub requested_at: DateTime<Utc>,
}

/// On-disk index payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectIndex {
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectRecord>,
    #[serde(default)]
    pub invalidations: Vec<Invalidation>,
}

impl ObjectIndex {
    /// Keys starting with `prefix`, in key order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// A stored key that would have to be both a file and a directory
    /// alongside `key`: an ancestor of it (`docs` for `docs/index.html`) or
    /// one nested under it.
    pub fn conflicting_key(&self, key: &str) -> Option<String> {
        let ancestor = key
            .match_indices('/')
            .map(|(i, _)| &key[..i])
            .find(|parent| self.objects.contains_key(*parent));
        if let Some(parent) = ancestor {
            return Some(parent.to_string());
        }
        self.keys_with_prefix(&format!("{key}/")).into_iter().next()
    }
}

/// `<root>/.bucketsync/index.json`
pub fn index_path_at(root: &Path) -> PathBuf {
    root.join(INDEX_DIR).join("index.json")
}

/// Load the index for the bucket at `root`.
///
/// Returns an empty index if the file does not yet exist.
pub async fn load_at(root: &Path) -> Result<ObjectIndex, RemoteError> {
    let path = index_path_at(root);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ObjectIndex::default()),
        Err(e) => return Err(io_err(&path, e)),
    };
    Ok(serde_json::from_str(&contents)?)
}

/// Save the index for the bucket at `root` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub async fn save_at(root: &Path, index: &ObjectIndex) -> Result<(), RemoteError> {
    let path = index_path_at(root);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid index path")));
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(index)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &json)
        .await
        .map_err(|e| io_err(&tmp, e))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| io_err(&path, e))?;
    Ok(())
}
