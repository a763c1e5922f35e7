//! A single systemd-boot entry file.

use std::path::Path;

use serde::Serialize;

use super::kv::{read_key_values, KeyValueMap, KvValue};
use super::options::{parse_options, OptionValue, OptionsMap};
use crate::error::{Error, Result};

const OPTIONS_KEY: &str = "options";

/// A parsed boot loader entry (`loader/entries/*.conf`).
///
/// Serializes as a flat object: every key from the file, plus `options`
/// as a nested map when the file had an `options` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootEntry {
    #[serde(flatten)]
    fields: KeyValueMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OptionsMap>,
}

impl BootEntry {
    /// Build an entry from the raw key-value map of `path`.
    pub fn from_key_values(path: &Path, mut fields: KeyValueMap) -> Result<Self> {
        let options = match fields.remove(OPTIONS_KEY) {
            None => None,
            Some(KvValue::Scalar(options)) => Some(parse_options(&options)),
            Some(KvValue::Sequence(lines)) => {
                return Err(Error::malformed(
                    path,
                    format!("'{OPTIONS_KEY}' appears {} times", lines.len()),
                ));
            }
        };

        Ok(Self { fields, options })
    }

    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.fields.get(key)
    }

    /// Every value recorded for `key`, empty if the key is absent.
    pub fn values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.fields
            .get(key)
            .into_iter()
            .flat_map(|value| value.iter())
    }

    pub fn fields(&self) -> &KeyValueMap {
        &self.fields
    }

    pub fn options(&self) -> Option<&OptionsMap> {
        self.options.as_ref()
    }

    /// Replace the value of option `key` with `placeholder`, if present.
    pub(crate) fn redact_option(&mut self, key: &str, placeholder: &str) -> bool {
        match self.options.as_mut().and_then(|options| options.get_mut(key)) {
            Some(value) => {
                *value = OptionValue::Value(placeholder.to_string());
                true
            }
            None => false,
        }
    }
}

/// Parse a single boot entry file.
pub async fn parse_entry(path: &Path) -> Result<BootEntry> {
    let fields = read_key_values(path).await?;
    BootEntry::from_key_values(path, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systemd_boot::kv::parse_key_values;
    use serde_json::json;
    use tempfile::TempDir;

    fn entry(text: &str) -> Result<BootEntry> {
        BootEntry::from_key_values(Path::new("arch.conf"), parse_key_values(text))
    }

    #[test]
    fn test_options_become_nested_map() {
        let entry = entry(
            "title Arch Linux\nlinux /vmlinuz-linux\ninitrd /initramfs-linux.img\n\
             options root=LABEL=root rw quiet\n",
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "title": "Arch Linux",
                "linux": "/vmlinuz-linux",
                "initrd": "/initramfs-linux.img",
                "options": {"root": "LABEL=root", "rw": true, "quiet": true}
            })
        );
    }

    #[test]
    fn test_entry_without_options_is_kept() {
        let entry = entry("title Fallback\nefi /EFI/tools/shell.efi\n").unwrap();
        assert!(entry.options().is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, json!({"title": "Fallback", "efi": "/EFI/tools/shell.efi"}));
    }

    #[test]
    fn test_repeated_options_is_malformed() {
        let err = entry("options quiet\noptions splash\n").unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { .. }));
    }

    #[test]
    fn test_values_flattens_repeated_keys() {
        let entry = entry("initrd /ucode.img\ninitrd /initrd.img\n").unwrap();
        let initrds: Vec<&str> = entry.values("initrd").collect();
        assert_eq!(initrds, vec!["/ucode.img", "/initrd.img"]);
        assert_eq!(entry.values("linux").count(), 0);
    }

    #[test]
    fn test_redact_option() {
        let mut entry = entry("options tre-invite=secrettoken quiet\n").unwrap();
        assert!(entry.redact_option("tre-invite", "$TRE_INVITE"));
        assert!(!entry.redact_option("missing", "$TRE_INVITE"));

        let options = entry.options().unwrap();
        assert_eq!(options["tre-invite"].as_str(), Some("$TRE_INVITE"));
        assert_eq!(options["quiet"], OptionValue::Flag);
    }

    #[tokio::test]
    async fn test_parse_entry_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tre.conf");
        std::fs::write(&path, "title TRE\nlinux /vmlinuz\noptions console=ttyS0,115200n8\n")
            .unwrap();

        let entry = parse_entry(&path).await.unwrap();
        assert_eq!(entry.get("title"), Some(&KvValue::Scalar("TRE".into())));
        assert_eq!(
            entry.options().unwrap()["console"].as_str(),
            Some("ttyS0,115200n8")
        );
    }
}
