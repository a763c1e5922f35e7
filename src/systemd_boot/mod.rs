//! systemd-boot configuration and entry parsing.
//!
//! - [`kv`] - line-oriented `key value` files with repeated keys
//! - [`options`] - the kernel command line in an entry's `options` field
//! - [`entry`] - a single `loader/entries/*.conf` file
//! - [`loader`] - `loader.conf` and concurrent parsing of many entries
//! - [`detect`] - discovery of the layout under a boot root

pub mod detect;
pub mod entry;
pub mod kv;
pub mod loader;
pub mod options;

pub use detect::{auto_detect, AutoDetectResult};
pub use entry::{parse_entry, BootEntry};
pub use kv::{parse_key_values, read_key_values, KeyValueMap, KvValue};
pub use loader::{entry_name, parse_config, parse_entries, BootEntryCollection};
pub use options::{parse_options, OptionValue, OptionsMap};
