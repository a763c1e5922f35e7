use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use super::entry::{parse_entry, BootEntry};
use super::kv::{read_key_values, KeyValueMap};
use crate::error::{Error, Result};

/// Boot entries keyed by the basename of the file they were read from.
pub type BootEntryCollection = BTreeMap<String, BootEntry>;

/// Parse `loader/loader.conf`.
pub async fn parse_config(path: &Path) -> Result<KeyValueMap> {
    read_key_values(path).await
}

/// Name an entry after its file's basename.
pub fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed(path, "entry path has no UTF-8 file name"))
}

/// Parse every entry file, at most `concurrency` at a time.
///
/// The first failing entry fails the whole collection.
pub async fn parse_entries(paths: &[PathBuf], concurrency: usize) -> Result<BootEntryCollection> {
    let mut named: BTreeMap<String, &Path> = BTreeMap::new();
    for path in paths {
        match named.entry(entry_name(path)?) {
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
            Entry::Occupied(slot) if *slot.get() == path.as_path() => {}
            Entry::Occupied(slot) => {
                return Err(Error::DuplicateEntry {
                    name: slot.key().clone(),
                    first: slot.get().to_path_buf(),
                    second: path.clone(),
                });
            }
        }
    }

    let entries: BootEntryCollection = stream::iter(named)
        .map(|(name, path)| async move {
            let entry = parse_entry(path).await?;
            debug!(entry = %name, path = %path.display(), "parsed boot entry");
            Ok::<_, Error>((name, entry))
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_entries(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("entry-{i}.conf"));
                fs::write(
                    &path,
                    format!("title Entry {i}\nlinux /vmlinuz-{i}\noptions quiet idx={i}\n"),
                )
                .unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_parse_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("loader.conf");
        fs::write(&path, "default tre.conf\ntimeout 0\neditor no\n").unwrap();

        let config = parse_config(&path).await.unwrap();
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            serde_json::json!({"default": "tre.conf", "timeout": "0", "editor": "no"})
        );
    }

    #[tokio::test]
    async fn test_parse_entries_keyed_by_basename() {
        let temp = TempDir::new().unwrap();
        let paths = write_entries(temp.path(), 3);

        let entries = parse_entries(&paths, 4).await.unwrap();
        let names: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["entry-0.conf", "entry-1.conf", "entry-2.conf"]);

        let json = serde_json::to_value(&entries["entry-1.conf"]).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["options"]["idx"], "1");
    }

    #[tokio::test]
    async fn test_parse_entries_independent_of_order() {
        let temp = TempDir::new().unwrap();
        let paths = write_entries(temp.path(), 12);
        let mut reversed = paths.clone();
        reversed.reverse();

        let forward = parse_entries(&paths, 4).await.unwrap();
        let backward = parse_entries(&reversed, 3).await.unwrap();
        let serial = parse_entries(&paths, 1).await.unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, serial);
    }

    #[tokio::test]
    async fn test_parse_entries_fails_on_any_error() {
        let temp = TempDir::new().unwrap();
        let mut paths = write_entries(temp.path(), 3);
        paths.push(temp.path().join("missing.conf"));

        let err = parse_entries(&paths, 4).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[tokio::test]
    async fn test_parse_entries_rejects_shared_basename() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        let first = write_entries(&a, 1);
        let second = write_entries(&b, 1);

        let paths = vec![first[0].clone(), second[0].clone()];
        let err = parse_entries(&paths, 4).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry { ref name, .. } if name == "entry-0.conf"));
    }

    #[tokio::test]
    async fn test_parse_entries_tolerates_repeated_path() {
        let temp = TempDir::new().unwrap();
        let paths = write_entries(temp.path(), 1);
        let repeated = vec![paths[0].clone(), paths[0].clone()];

        let entries = parse_entries(&repeated, 4).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_entry_name_requires_file_name() {
        assert_eq!(entry_name(Path::new("/boot/loader/entries/a.conf")).unwrap(), "a.conf");
        assert!(entry_name(Path::new("/")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_name_rejects_non_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/boot/loader/entries").join(OsStr::from_bytes(b"bad\xff.conf"));
        let err = entry_name(&path).unwrap_err();
        assert!(err.to_string().contains("no UTF-8 file name"));
    }
}
