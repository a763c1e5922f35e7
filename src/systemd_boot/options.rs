//! Kernel command line splitting for the `options` field of boot entries.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Option key to value, last occurrence wins.
pub type OptionsMap = BTreeMap<String, OptionValue>;

/// A single kernel command line option.
///
/// `quiet` and `quiet=` are both a [`OptionValue::Flag`]; anything after the
/// first `=` is kept verbatim as a [`OptionValue::Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag,
    Value(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Flag => None,
            OptionValue::Value(value) => Some(value),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Flag => serializer.serialize_bool(true),
            OptionValue::Value(value) => serializer.serialize_str(value),
        }
    }
}

/// Split an options string into a map.
///
/// Every token is accepted. A token starting with `=` lands under the empty
/// key.
pub fn parse_options(options: &str) -> OptionsMap {
    let mut map = OptionsMap::new();

    for token in options.split_whitespace() {
        let (key, value) = token.split_once('=').unwrap_or((token, ""));
        let value = if value.is_empty() {
            OptionValue::Flag
        } else {
            OptionValue::Value(value.to_string())
        };
        map.insert(key.to_string(), value);
    }

    map
}
