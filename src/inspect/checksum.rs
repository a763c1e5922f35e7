//! Content checksums in the `<base64 digest>.sha256` form.
//!
//! The digest is the raw 32-byte SHA-256 output (not its hex rendering),
//! base64-encoded with the standard padded alphabet.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};

pub const CHECKSUM_SUFFIX: &str = ".sha256";

const READ_CHUNK: usize = 1024 * 1024;

pub fn encode_digest(digest: &[u8]) -> String {
    format!("{}{CHECKSUM_SUFFIX}", STANDARD.encode(digest))
}

/// Stream `path` through SHA-256.
pub async fn checksum_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).await.map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| Error::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(encode_digest(&hasher.finalize()))
}
