//! Manifest assembly.
//!
//! [`build_manifest`] gathers every fragment concurrently and hands them to
//! [`assemble`], which builds the final record field by field.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::inspect::{inspect_files, read_shrinkwrap, FileInfo, FileInfoMap, Packages};
use crate::systemd_boot::{
    parse_config, parse_entries, AutoDetectResult, BootEntryCollection, KeyValueMap,
};

/// Options whose values must never reach the manifest, with their placeholders.
pub const REDACTED_OPTIONS: &[(&str, &str)] = &[("tre-invite", "$TRE_INVITE")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    pub description: String,
    pub size: u64,
    pub checksum: String,
}

/// Artifacts keyed by basename.
pub type Artifacts = BTreeMap<String, ArtifactInfo>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bootloader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<KeyValueMap>,
    pub entries: BootEntryCollection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub kernels: Artifacts,
    pub initcpios: Artifacts,
    pub disk_images: Artifacts,
    pub shrinkwrap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Packages>,
    pub bootloader: Bootloader,
}

/// The files a manifest should describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRequest {
    pub kernels: Vec<PathBuf>,
    pub initcpios: Vec<PathBuf>,
    pub disk_images: Vec<PathBuf>,
    pub boot_config: Option<PathBuf>,
    pub boot_entries: Vec<PathBuf>,
    pub shrinkwrap: Option<PathBuf>,
}

impl ManifestRequest {
    /// Fold in an auto-detected layout.
    ///
    /// The detected config replaces any explicit one; detected entries,
    /// kernels and initrds are appended.
    pub fn with_detected(mut self, detected: AutoDetectResult) -> Self {
        self.boot_config = Some(detected.config);
        self.boot_entries.extend(detected.entries);
        self.kernels.extend(detected.kernels);
        self.initcpios.extend(detected.initrds);
        self.deduplicated()
    }

    /// Drop repeated paths, keeping the first occurrence.
    pub fn deduplicated(mut self) -> Self {
        for paths in [
            &mut self.kernels,
            &mut self.initcpios,
            &mut self.disk_images,
            &mut self.boot_entries,
        ] {
            let mut seen = HashSet::new();
            paths.retain(|path| seen.insert(path.clone()));
        }
        self
    }

    /// Every file that needs size, checksum and type.
    pub fn inspected_files(&self) -> Vec<PathBuf> {
        self.kernels
            .iter()
            .chain(&self.initcpios)
            .chain(&self.disk_images)
            .chain(&self.shrinkwrap)
            .cloned()
            .collect()
    }
}

/// Independently computed pieces of a manifest.
#[derive(Debug, Clone)]
pub struct ManifestParts<'a> {
    pub kernels: &'a [PathBuf],
    pub initcpios: &'a [PathBuf],
    pub disk_images: &'a [PathBuf],
    pub files: &'a FileInfoMap,
    pub shrinkwrap: Option<&'a Path>,
    pub packages: Option<Packages>,
    pub config: Option<KeyValueMap>,
    pub entries: BootEntryCollection,
}

/// Build the manifest record from its parts, redacting secret options.
pub fn assemble(parts: ManifestParts<'_>) -> Result<Manifest> {
    let ManifestParts {
        kernels,
        initcpios,
        disk_images,
        files,
        shrinkwrap,
        packages,
        config,
        mut entries,
    } = parts;

    let shrinkwrap = match shrinkwrap {
        Some(path) => Some(file_info(files, path)?.checksum.clone()),
        None => None,
    };

    for (name, entry) in entries.iter_mut() {
        for (option, placeholder) in REDACTED_OPTIONS {
            if entry.redact_option(option, placeholder) {
                debug!(entry = %name, option, "redacted boot entry option");
            }
        }
    }

    Ok(Manifest {
        kernels: artifacts(kernels, files)?,
        initcpios: artifacts(initcpios, files)?,
        disk_images: artifacts(disk_images, files)?,
        shrinkwrap,
        packages,
        bootloader: Bootloader { config, entries },
    })
}

fn file_info<'a>(files: &'a FileInfoMap, path: &Path) -> Result<&'a FileInfo> {
    files
        .get(path)
        .ok_or_else(|| Error::MissingFileInfo(path.to_path_buf()))
}

/// Key artifacts by basename. Two different paths may not share one.
fn artifacts(paths: &[PathBuf], files: &FileInfoMap) -> Result<Artifacts> {
    let mut artifacts = Artifacts::new();
    let mut sources: BTreeMap<String, &Path> = BTreeMap::new();
    for path in paths {
        let info = file_info(files, path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match sources.entry(name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
            Entry::Occupied(slot) if *slot.get() == path.as_path() => continue,
            Entry::Occupied(slot) => {
                return Err(Error::DuplicateArtifact {
                    name,
                    first: slot.get().to_path_buf(),
                    second: path.clone(),
                });
            }
        }
        artifacts.insert(
            name,
            ArtifactInfo {
                description: info.description.clone(),
                size: info.size,
                checksum: info.checksum.clone(),
            },
        );
    }
    Ok(artifacts)
}

/// Inspect files and parse boot data concurrently, then assemble.
pub async fn build_manifest(request: ManifestRequest, settings: &Settings) -> Result<Manifest> {
    let request = request.deduplicated();
    let concurrency = settings.inspect.concurrency;
    let inspected = request.inspected_files();

    let config = async {
        match &request.boot_config {
            Some(path) => parse_config(path).await.map(Some),
            None => Ok(None),
        }
    };
    let packages = async {
        match &request.shrinkwrap {
            Some(path) => read_shrinkwrap(path).await.map(Some),
            None => Ok(None),
        }
    };

    let (files, entries, config, packages) = tokio::try_join!(
        inspect_files(&inspected, &settings.inspect),
        parse_entries(&request.boot_entries, concurrency),
        config,
        packages,
    )?;

    info!(
        files = files.len(),
        entries = entries.len(),
        "collected manifest inputs"
    );

    assemble(ManifestParts {
        kernels: &request.kernels,
        initcpios: &request.initcpios,
        disk_images: &request.disk_images,
        files: &files,
        shrinkwrap: request.shrinkwrap.as_deref(),
        packages,
        config,
        entries,
    })
}
