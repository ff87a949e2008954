//! Running external probe tools.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::error::ProbeError;

/// Runs `program args... path` and returns its stdout.
///
/// The child is killed if it outlives `timeout_secs`.
pub(crate) async fn run_tool(
    tool: &str,
    program: &Path,
    args: &[&str],
    path: &Path,
    timeout_secs: u64,
) -> Result<Vec<u8>, ProbeError> {
    let child = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::ToolNotFound {
                    tool: tool.to_string(),
                    path: program.to_path_buf(),
                }
            } else {
                ProbeError::Io(e)
            }
        })?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(ProbeError::Timeout {
                tool: tool.to_string(),
                timeout_secs,
            })
        }
    };

    if !output.status.success() {
        return Err(ProbeError::ToolFailed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}
