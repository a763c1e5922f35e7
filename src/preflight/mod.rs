//! Preflight checks for manifest generation.
//!
//! Validates that the host has the external tools the inspector shells out
//! to, so a missing `file` binary is reported once up front instead of once
//! per inspected file.
//!
//! # Example
//!
//! ```rust
//! use boot_meta::preflight::{check_required_tools, command_exists};
//!
//! if !command_exists("file") {
//!     println!("file not installed");
//! }
//!
//! let tools = &[("file", "file")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use crate::config::InspectSettings;
use crate::error::{Error, Result};

/// Package providing the default type detector.
const FILE_PACKAGE: &str = "file";

/// Check if a command exists on the host system.
///
/// Accepts a bare name (searched in PATH) or a path to an executable.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Check that specific tools are available.
///
/// Each tuple is (command_name, package_name).
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<String> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .map(|(tool, package)| format!("  {} (install: {})", tool, package))
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingTools(missing.join("\n")));
    }

    Ok(())
}

/// Check the tools needed to inspect files with `settings`.
pub fn check_host_tools(settings: &InspectSettings) -> Result<()> {
    check_required_tools(&[(settings.file_command.as_str(), FILE_PACKAGE)])
}
