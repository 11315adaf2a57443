use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::constants::{DEFAULT_PYTHON, SCRIPT_EXTENSION, SCRIPT_TIMEOUT_SECS};
use crate::logging::{log_info, log_warn};

use super::path_guard::Root;
use super::{ToolError, ToolResult};

/// Runs Python files inside the root as child processes
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: Duration::from_secs(SCRIPT_TIMEOUT_SECS),
        }
    }

    /// Set execution timeout (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Execute `file_path` with the root as working directory
    ///
    /// The child is killed if it outlives the timeout.
    pub async fn run(&self, root: &Root, file_path: &str) -> ToolResult {
        if !file_path.ends_with(SCRIPT_EXTENSION) {
            return Err(ToolError::InvalidFileType(file_path.to_string()));
        }

        let path = root
            .resolve(Some(file_path))
            .map_err(|e| ToolError::from_containment(e, "execute"))?;

        match tokio::fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ToolError::NotFound(file_path.to_string()));
            }
            Err(e) => return Err(ToolError::io("Failed to access Python file", e)),
        }

        log_info(&format!(
            "Running {} {} (timeout: {}s)",
            self.interpreter,
            path.display(),
            self.timeout.as_secs()
        ));

        let child = Command::new(&self.interpreter)
            .arg(&path)
            .current_dir(root.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::io("Failed to execute Python file", e))?;

        // Dropping the timed-out future drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::io("Failed to execute Python file", e))?,
            Err(_) => {
                log_warn(&format!(
                    "{} exceeded {}s and was killed",
                    file_path,
                    self.timeout.as_secs()
                ));
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(compose_output(&stdout, &stderr, exit_code))
    }
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

/// Build the run report: STDOUT, STDERR, then the exit code line, each only when present
fn compose_output(stdout: &str, stderr: &str, exit_code: i32) -> String {
    let mut sections = Vec::new();

    if !stdout.is_empty() {
        sections.push(format!("STDOUT:\n{}", stdout.trim()));
    }
    if !stderr.is_empty() {
        sections.push(format!("STDERR:\n{}", stderr.trim()));
    }
    if exit_code != 0 {
        sections.push(format!("Error: Process exited with code {}", exit_code));
    }

    if sections.is_empty() {
        return "No output produced.".to_string();
    }

    sections.join("\n\n")
}
