//! Per-file facts for the manifest: size, checksum and a type description.
//!
//! Files are inspected independently with at most
//! [`InspectSettings::concurrency`] in flight.

pub mod checksum;
pub mod filetype;
pub mod packages;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::config::InspectSettings;
use crate::error::{Error, Result};

pub use checksum::checksum_file;
pub use filetype::describe_file;
pub use packages::{read_shrinkwrap, Packages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub checksum: String,
    pub description: String,
}

pub type FileInfoMap = BTreeMap<PathBuf, FileInfo>;

/// Stat, checksum and describe a single file.
pub async fn inspect_file(path: &Path, settings: &InspectSettings) -> Result<FileInfo> {
    let (metadata, checksum, description) = tokio::try_join!(
        async { tokio::fs::metadata(path).await.map_err(|e| Error::io(path, e)) },
        checksum_file(path),
        describe_file(&settings.file_command, path),
    )?;

    debug!(path = %path.display(), size = metadata.len(), %checksum, "inspected file");

    Ok(FileInfo {
        path: path.to_path_buf(),
        size: metadata.len(),
        checksum,
        description,
    })
}

/// Inspect every distinct path. The first failure aborts the rest.
pub async fn inspect_files(paths: &[PathBuf], settings: &InspectSettings) -> Result<FileInfoMap> {
    let distinct: BTreeSet<&PathBuf> = paths.iter().collect();

    stream::iter(distinct)
        .map(|path| async move {
            let info = inspect_file(path, settings).await?;
            Ok::<_, Error>((path.clone(), info))
        })
        .buffer_unordered(settings.concurrency.max(1))
        .try_collect()
        .await
}
