//! Describe a bootable image set as a JSON manifest.
//!
//! Given kernels, initcpios, disk images, a package shrinkwrap and a
//! systemd-boot configuration, this crate produces a deterministic manifest
//! with sizes, checksums, file types, parsed boot entries and package
//! versions for downstream deployment and signing.
//!
//! - **systemd-boot parsing** - `loader.conf`, entry files and their kernel options
//! - **Auto-detection** - discover config, entries, kernels and initrds under a boot root
//! - **File inspection** - size, `<base64>.sha256` checksum and `file --brief` type
//! - **Manifest assembly** - typed fragments merged into one record
//!
//! # Architecture
//!
//! ```text
//! auto_detect(root) ──► ManifestRequest ──► build_manifest
//!                                             ├── inspect_files   (size, checksum, type)
//!                                             ├── parse_entries   (loader/entries/*.conf)
//!                                             ├── parse_config    (loader/loader.conf)
//!                                             └── read_shrinkwrap (explicit packages)
//!                                                      │
//!                                                      ▼
//!                                                  assemble ──► Manifest (JSON)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use boot_meta::{auto_detect, build_manifest, ManifestRequest, Settings};
//!
//! let settings = Settings::default();
//! let detected = auto_detect(Path::new("/boot"), settings.inspect.concurrency)
//!     .await?
//!     .expect("systemd-boot layout");
//! let manifest = build_manifest(ManifestRequest::default().with_detected(detected), &settings).await?;
//! println!("{}", serde_json::to_string_pretty(&manifest)?);
//! ```

pub mod config;
pub mod error;
pub mod inspect;
pub mod manifest;
pub mod preflight;
pub mod systemd_boot;

pub use config::Settings;
pub use error::{Error, Result};
pub use manifest::{assemble, build_manifest, Manifest, ManifestParts, ManifestRequest};
pub use systemd_boot::{auto_detect, parse_config, parse_entries, parse_entry, AutoDetectResult};
