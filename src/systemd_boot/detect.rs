//! Discovery of a systemd-boot layout under a boot root.
//!
//! ```text
//! <root>/
//!   loader/
//!     loader.conf
//!     entries/
//!       *.conf        -> linux /vmlinuz-...  initrd /initramfs-...
//! ```

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::loader::{parse_entries, BootEntryCollection};
use crate::error::{Error, Result};

const LOADER_DIR: &str = "loader";
const LOADER_CONF: &str = "loader.conf";
const ENTRIES_DIR: &str = "entries";

/// Everything found under a boot root with a `loader/loader.conf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoDetectResult {
    pub config: PathBuf,
    pub entries: Vec<PathBuf>,
    pub kernels: Vec<PathBuf>,
    pub initrds: Vec<PathBuf>,
}

/// Inspect `root` for a systemd-boot layout.
///
/// Returns `Ok(None)` when there is no `loader/loader.conf`. Kernel and
/// initrd references are de-duplicated and resolved against `root`.
pub async fn auto_detect(root: &Path, concurrency: usize) -> Result<Option<AutoDetectResult>> {
    let config = root.join(LOADER_DIR).join(LOADER_CONF);
    if !metadata_if_exists(&config).await?.is_some_and(|m| m.is_file()) {
        debug!(root = %root.display(), "no {LOADER_DIR}/{LOADER_CONF} under boot root");
        return Ok(None);
    }

    let root = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| Error::io(root, e))?;
    let loader_dir = root.join(LOADER_DIR);
    let config = loader_dir.join(LOADER_CONF);
    let entries_dir = loader_dir.join(ENTRIES_DIR);

    if !metadata_if_exists(&entries_dir).await?.is_some_and(|m| m.is_dir()) {
        info!(config = %config.display(), "boot root has no entries directory");
        return Ok(Some(AutoDetectResult {
            config,
            ..AutoDetectResult::default()
        }));
    }

    let entries = list_entry_files(&entries_dir).await?;
    let parsed = parse_entries(&entries, concurrency).await?;
    let kernels = referenced_paths(&root, &parsed, "linux");
    let initrds = referenced_paths(&root, &parsed, "initrd");

    info!(
        root = %root.display(),
        entries = entries.len(),
        kernels = kernels.len(),
        initrds = initrds.len(),
        "auto-detected systemd-boot layout"
    );

    Ok(Some(AutoDetectResult {
        config,
        entries,
        kernels,
        initrds,
    }))
}

async fn metadata_if_exists(path: &Path) -> Result<Option<Metadata>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Regular files directly inside `dir`, sorted.
async fn list_entry_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let path = entry.path();
        // Follows symlinks; dangling links are skipped.
        if metadata_if_exists(&path).await?.is_some_and(|m| m.is_file()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Values of `key` across all entries, first occurrence first, as paths under `root`.
fn referenced_paths(root: &Path, entries: &BootEntryCollection, key: &str) -> Vec<PathBuf> {
    let mut seen: Vec<&str> = Vec::new();
    for reference in entries.values().flat_map(|entry| entry.values(key)) {
        if reference.is_empty() || seen.contains(&reference) {
            continue;
        }
        seen.push(reference);
    }

    seen.into_iter()
        .map(|reference| resolve_in_root(root, reference))
        .collect()
}

/// Entry paths are relative to the boot root even when they start with `/`.
fn resolve_in_root(root: &Path, reference: &str) -> PathBuf {
    root.join(reference.trim_start_matches('/'))
}
