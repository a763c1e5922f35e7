//! Package pins from a shrinkwrap file.
//!
//! Each line is `<id> <type> <name> <version> ...`. Only `explicit` records
//! are kept; a later record for the same name replaces an earlier one.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};

const EXPLICIT: &str = "explicit";

/// Package name to pinned version.
pub type Packages = BTreeMap<String, String>;

pub fn parse_shrinkwrap(text: &str) -> Packages {
    let mut packages = Packages::new();

    for (index, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let (Some(_id), Some(kind)) = (fields.next(), fields.next()) else {
            continue;
        };
        if kind != EXPLICIT {
            continue;
        }
        let (Some(name), Some(version)) = (fields.next(), fields.next()) else {
            warn!(line = index + 1, "skipping explicit shrinkwrap record without name and version");
            continue;
        };
        packages.insert(name.to_string(), version.to_string());
    }

    packages
}

pub async fn read_shrinkwrap(path: &Path) -> Result<Packages> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    Ok(parse_shrinkwrap(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_only_explicit_records_later_wins() {
        let packages = parse_shrinkwrap(
            "k1 explicit foo 1.0.0\nk2 implicit bar 2.0.0\nk3 explicit foo 1.2.0\n",
        );
        assert_eq!(
            packages,
            Packages::from([("foo".to_string(), "1.2.0".to_string())])
        );
    }

    #[test]
    fn test_extra_fields_and_blank_lines() {
        let packages = parse_shrinkwrap(
            "\n%abc=.sha256 explicit tre-boot 3.1.4 https://example.invalid/blob\n\n\
             k2 explicit  ssb-db   20.0.1\n",
        );
        assert_eq!(packages["tre-boot"], "3.1.4");
        assert_eq!(packages["ssb-db"], "20.0.1");
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn test_incomplete_explicit_record_is_skipped() {
        let packages = parse_shrinkwrap("k1 explicit lonely\nk2\nk3 explicit ok 1.0\n");
        assert_eq!(packages.len(), 1);
        assert_eq!(packages["ok"], "1.0");
    }

    #[test]
    fn test_type_must_match_exactly() {
        let packages = parse_shrinkwrap("k1 Explicit foo 1.0\nk2 explicit: bar 1.0\n");
        assert!(packages.is_empty());
    }

    #[tokio::test]
    async fn test_read_shrinkwrap_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shrinkwrap");
        std::fs::write(&path, "k1 explicit foo 1.0.0\n").unwrap();

        let packages = read_shrinkwrap(&path).await.unwrap();
        assert_eq!(packages["foo"], "1.0.0");

        let err = read_shrinkwrap(&temp.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
