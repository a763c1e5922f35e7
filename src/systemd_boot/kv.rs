//! Line-oriented `key value` files, as used by `loader.conf` and entry files.
//!
//! Each non-blank line is split on its first run of whitespace. The key is
//! everything before it, the value is the trimmed remainder (possibly empty).
//! Keys that appear more than once are promoted from a scalar to a sequence.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// Key to value(s) mapping read from a single file.
pub type KeyValueMap = BTreeMap<String, KvValue>;

/// Value of a key, shaped by how often the key occurred in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum KvValue {
    Scalar(String),
    Sequence(Vec<String>),
}

impl KvValue {
    /// Record another occurrence of the same key.
    fn push(&mut self, value: String) {
        match self {
            KvValue::Scalar(first) => {
                let first = std::mem::take(first);
                *self = KvValue::Sequence(vec![first, value]);
            }
            KvValue::Sequence(values) => values.push(value),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            KvValue::Scalar(value) => Some(value),
            KvValue::Sequence(_) => None,
        }
    }

    /// All values in file order, regardless of arity.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values = match self {
            KvValue::Scalar(value) => std::slice::from_ref(value),
            KvValue::Sequence(values) => values.as_slice(),
        };
        values.iter().map(String::as_str)
    }
}

/// Parse key-value text that has already been read into memory.
pub fn parse_key_values(text: &str) -> KeyValueMap {
    let mut map = KeyValueMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (key, value) = match line.split_once(char::is_whitespace) {
            Some((key, rest)) => (key, rest.trim()),
            None => (line, ""),
        };

        match map.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(KvValue::Scalar(value.to_string()));
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(value.to_string()),
        }
    }

    map
}

/// Read and parse a key-value file.
pub async fn read_key_values(path: &Path) -> Result<KeyValueMap> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    Ok(parse_key_values(&text))
}
