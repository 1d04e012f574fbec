//! Flags shared by `bucketsync sync` and `bucketsync plan`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use bucketsync_core::{config, SyncSettings};
use bucketsync_store::{DirBucket, DryRunStore, ObjectPolicy, RemoteStore};

/// Settings flags. Each one given overrides the matching `--config` value.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// YAML settings file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bucket directory objects are stored in.
    #[arg(long, value_name = "DIR")]
    pub bucket: Option<String>,

    /// Local directory to mirror [default: .]
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Prefix objects are placed under.
    #[arg(long, value_name = "PREFIX")]
    pub target: Option<String>,

    /// Delete bucket objects with no local counterpart.
    #[arg(long)]
    pub delete: bool,

    /// Redirect `key` to `target` (repeatable).
    #[arg(long = "redirect", value_name = "KEY=TARGET", value_parser = parse_redirect)]
    pub redirects: Vec<(String, String)>,

    /// Distribution whose cache is invalidated after a successful run.
    #[arg(long, value_name = "DISTRIBUTION")]
    pub invalidate: Option<String>,

    /// Upper bound on concurrent bucket calls [default: 100]
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Log every write instead of performing it.
    #[arg(long)]
    pub dry_run: bool,
}

impl SettingsArgs {
    /// Config file (if any) with flags laid over it, validated, and with
    /// local paths resolved against the working directory.
    pub fn resolve(&self) -> Result<SyncSettings> {
        let mut settings = match &self.config {
            Some(path) => config::load_at(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => SyncSettings::default(),
        };
        self.apply(&mut settings);

        let cwd = std::env::current_dir().context("could not determine working directory")?;
        settings.source = absolutize(&cwd, &settings.source);
        let settings = settings.sanitize().context("invalid settings")?;
        let bucket = absolutize(&cwd, Path::new(&settings.bucket));
        ensure_disjoint(&settings.source, &bucket)?;
        Ok(SyncSettings {
            bucket: bucket.to_string_lossy().into_owned(),
            ..settings
        })
    }

    fn apply(&self, settings: &mut SyncSettings) {
        if let Some(bucket) = &self.bucket {
            settings.bucket = bucket.clone();
        }
        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        if let Some(target) = &self.target {
            settings.target = target.clone();
        }
        if let Some(invalidate) = &self.invalidate {
            settings.invalidate = Some(invalidate.clone());
        }
        if let Some(max) = self.max_concurrency {
            settings.max_concurrency = max;
        }
        settings.delete |= self.delete;
        settings.dry_run |= self.dry_run;
        settings.redirects.extend(self.redirects.iter().cloned());
    }
}

/// Open the bucket directory named by `settings`, wrapped for dry runs.
pub async fn open_store(settings: &SyncSettings) -> Result<Arc<dyn RemoteStore>> {
    let policy = ObjectPolicy::from_config(&settings.objects)
        .context("invalid object policy in settings")?;
    let bucket = DirBucket::open(&settings.bucket, policy)
        .await
        .with_context(|| format!("failed to open bucket at {}", settings.bucket))?;
    if settings.dry_run {
        Ok(Arc::new(DryRunStore::new(bucket)))
    } else {
        Ok(Arc::new(bucket))
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// A bucket under the source tree would be walked and uploaded into itself
/// on every run.
fn ensure_disjoint(source: &Path, bucket: &Path) -> Result<()> {
    if source.is_dir() && bucket.starts_with(source) {
        bail!(
            "bucket directory {} lies inside source {}; move it out of the synced tree",
            bucket.display(),
            source.display()
        );
    }
    Ok(())
}

fn parse_redirect(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, target)) if !key.is_empty() && !target.is_empty() => {
            Ok((key.to_string(), target.to_string()))
        }
        _ => Err(format!("expected KEY=TARGET, got '{raw}'")),
    }
}
