//! Diff the local tree and redirect table against a remote listing.
//!
//! Relative keys are built from path components, so they are `/`-separated
//! on every platform and a source root of `.` never eats into file names.
//! Only a single leading separator is ever trimmed from a key.

use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use bucketsync_core::{Job, RedirectTable};

use crate::error::SyncError;
use crate::observer::SyncObserver;

/// Build the job list for one run.
///
/// Uploads come first (in file-name order), then redirects, then deletes.
/// Deletes are only considered when `delete` is set; a listed key is kept
/// when, stripped of `prefix` and one leading separator, it equals a local
/// relative key or a redirect source key.
///
/// No invalidation job is emitted here.
pub fn plan(
    local_root: &Path,
    prefix: &str,
    remote: &[String],
    redirects: &RedirectTable,
    delete: bool,
    observer: &dyn SyncObserver,
) -> Result<Vec<Job>, SyncError> {
    let local_keys = local_keys(local_root)?;
    let mut jobs = Vec::with_capacity(local_keys.len() + redirects.len());

    let root_is_file = local_root.is_file();
    for key in &local_keys {
        let local = if root_is_file {
            local_root.to_path_buf()
        } else {
            local_root.join(key_to_path(key))
        };
        jobs.push(Job::upload(
            local.to_string_lossy().into_owned(),
            join_key(prefix, key),
        ));
    }

    for (source, target) in redirects {
        jobs.push(Job::redirect(strip_separator(source), target.as_str()));
    }

    if delete {
        let known: HashSet<&str> = local_keys
            .iter()
            .map(String::as_str)
            .chain(redirects.keys().map(|source| strip_separator(source)))
            .collect();

        for listed in remote {
            if !listed.starts_with(prefix) {
                observer.remote_outside_prefix(listed, prefix);
            }
            let candidate = delete_candidate(listed, prefix);
            let matched = known.contains(candidate);
            observer.delete_candidate(listed, candidate, matched);
            if !matched {
                jobs.push(Job::delete(listed.as_str()));
            }
        }
    }

    Ok(jobs)
}

/// Relative keys of every regular file under `root`, in walk order.
pub fn local_keys(root: &Path) -> Result<Vec<String>, SyncError> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| SyncError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        if !is_file(&entry) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let key = relative_key(relative);
        if key.is_empty() {
            // `root` itself is a file.
            keys.push(entry.file_name().to_string_lossy().into_owned());
        } else {
            keys.push(key);
        }
    }
    Ok(keys)
}

fn is_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Join path components with `/`.
fn relative_key(relative: &Path) -> String {
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

fn key_to_path(key: &str) -> std::path::PathBuf {
    key.split('/').collect()
}

/// `prefix/key`, with exactly one `/` between a non-empty prefix and the key.
pub fn join_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}/{key}")
    }
}

/// Trim one leading `/` or `\`.
pub fn strip_separator(key: &str) -> &str {
    key.strip_prefix(['/', '\\']).unwrap_or(key)
}

/// The relative key a listed remote key is compared under.
pub fn delete_candidate<'a>(listed: &'a str, prefix: &str) -> &'a str {
    strip_separator(listed.strip_prefix(prefix).unwrap_or(listed))
}
