//! Per-object header resolution.
//!
//! Content type and content encoding are looked up by extension; access,
//! cache control and metadata by glob pattern over the object key. Pattern
//! tables are evaluated in sorted pattern order and the first match wins,
//! except metadata where every matching map is merged.

use std::collections::BTreeMap;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

use bucketsync_core::ObjectPolicyConfig;

use crate::error::RemoteError;

/// Access value applied when no access pattern matches.
pub const DEFAULT_ACCESS: &str = "private";

/// Content type applied when neither the config nor the built-in table knows
/// the extension.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Headers attached to a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHeaders {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    pub access: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Compiled form of [`ObjectPolicyConfig`].
#[derive(Debug, Clone, Default)]
pub struct ObjectPolicy {
    content_type: BTreeMap<String, String>,
    content_encoding: BTreeMap<String, String>,
    access: Vec<(GlobMatcher, String)>,
    cache_control: Vec<(GlobMatcher, String)>,
    metadata: Vec<(GlobMatcher, BTreeMap<String, String>)>,
}

impl ObjectPolicy {
    pub fn from_config(config: &ObjectPolicyConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            content_type: normalize_extensions(&config.content_type),
            content_encoding: normalize_extensions(&config.content_encoding),
            access: compile(&config.access)?,
            cache_control: compile(&config.cache_control)?,
            metadata: compile(&config.metadata)?,
        })
    }

    /// Headers for the object stored under `key`.
    pub fn resolve(&self, key: &str) -> ObjectHeaders {
        let ext = extension_of(key);

        let content_type = ext
            .as_deref()
            .and_then(|e| {
                self.content_type
                    .get(e)
                    .cloned()
                    .or_else(|| builtin_content_type(e).map(str::to_string))
            })
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let content_encoding = ext
            .as_deref()
            .and_then(|e| self.content_encoding.get(e).cloned());

        let access = first_match(&self.access, key)
            .cloned()
            .unwrap_or_else(|| DEFAULT_ACCESS.to_string());
        let cache_control = first_match(&self.cache_control, key).cloned();

        let mut metadata = BTreeMap::new();
        for (matcher, values) in &self.metadata {
            if matcher.is_match(key) {
                metadata.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        ObjectHeaders {
            content_type,
            content_encoding,
            cache_control,
            access,
            metadata,
        }
    }
}

fn compile<V: Clone>(table: &BTreeMap<String, V>) -> Result<Vec<(GlobMatcher, V)>, RemoteError> {
    table
        .iter()
        .map(|(pattern, value)| {
            let glob = Glob::new(pattern).map_err(|source| RemoteError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            Ok((glob.compile_matcher(), value.clone()))
        })
        .collect()
}

fn first_match<'a, V>(rules: &'a [(GlobMatcher, V)], key: &str) -> Option<&'a V> {
    rules
        .iter()
        .find(|(matcher, _)| matcher.is_match(key))
        .map(|(_, value)| value)
}

/// `.svg`, `svg` and `.SVG` all configure the same extension.
fn normalize_extensions(table: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    table
        .iter()
        .map(|(ext, value)| {
            let ext = ext.trim_start_matches('.').to_ascii_lowercase();
            (format!(".{ext}"), value.clone())
        })
        .collect()
}

fn extension_of(key: &str) -> Option<String> {
    Path::new(key)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_ascii_lowercase()))
}

fn builtin_content_type(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        ".html" | ".htm" => "text/html",
        ".css" => "text/css",
        ".js" | ".mjs" => "application/javascript",
        ".json" => "application/json",
        ".xml" => "application/xml",
        ".txt" => "text/plain",
        ".md" => "text/markdown",
        ".csv" => "text/csv",
        ".svg" => "image/svg+xml",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".ico" => "image/x-icon",
        ".woff" => "font/woff",
        ".woff2" => "font/woff2",
        ".pdf" => "application/pdf",
        ".wasm" => "application/wasm",
        ".zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}
