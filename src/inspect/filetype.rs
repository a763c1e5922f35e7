use std::path::Path;

use tokio::process::Command;

use crate::error::{Error, Result};

/// Default type detector, invoked as `file --brief <path>`.
pub const DEFAULT_FILE_COMMAND: &str = "file";

/// One-line description of `path` from `program --brief <path>`.
pub async fn describe_file(program: &str, path: &Path) -> Result<String> {
    let tool_error = |reason: String| Error::ExternalTool {
        tool: program.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let output = Command::new(program)
        .arg("--brief")
        .arg(path)
        .output()
        .await
        .map_err(|e| tool_error(format!("failed to run: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(tool_error(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|_| tool_error("output is not valid UTF-8".to_string()))?;
    let description = stdout.trim();
    if description.is_empty() {
        return Err(tool_error("produced no output".to_string()));
    }

    Ok(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_output_is_trimmed() {
        // echo stands in for a detector that prints its arguments
        let description = describe_file("echo", Path::new("/boot/vmlinuz")).await.unwrap();
        assert_eq!(description, "--brief /boot/vmlinuz");
    }

    #[tokio::test]
    async fn test_failing_tool() {
        let err = describe_file("false", Path::new("/boot/vmlinuz"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalTool { ref tool, .. } if tool == "false"));
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let err = describe_file("definitely_not_a_real_command_12345", Path::new("/x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }

    #[tokio::test]
    async fn test_file_command_describes_text() {
        if which::which(DEFAULT_FILE_COMMAND).is_err() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("loader.conf");
        fs::write(&path, "default arch.conf\n").unwrap();

        let description = describe_file(DEFAULT_FILE_COMMAND, &path).await.unwrap();
        assert!(description.contains("text"), "got: {description}");
    }
}
