/// Tools module for function calling / tool use capabilities
///
/// This module provides the sandboxed tool-execution layer:
/// - Root and path containment checks for every filesystem operation
/// - File listing, reading and writing handlers
/// - A Python script runner with a wall-clock timeout
/// - Tool trait and registry exposing the catalog to the model
/// - Dispatcher turning model tool calls into tool responses
mod dispatcher;
mod files;
mod implementations;
mod path_guard;
mod registry;
mod script;

use thiserror::Error;

pub use dispatcher::ToolDispatcher;
pub use files::{list_directory, read_file, write_file};
pub use implementations::{GetFileContentTool, GetFilesInfoTool, RunPythonFileTool, WriteFileTool};
pub use path_guard::{ContainmentError, Root, resolve};
pub use registry::{AgentTool, ToolRegistry, ToolSpec};
pub use script::ScriptRunner;

/// Outcome of a single tool handler
pub type ToolResult = Result<String, ToolError>;

/// Tool-level failures
///
/// These never abort the agent: they are rendered as text and handed back to
/// the model so it can correct itself.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Containment(ContainmentError),

    #[error("Cannot {action} \"{path}\" as it is outside the permitted working directory")]
    PathEscape { action: &'static str, path: String },

    #[error("\"{0}\" does not exist")]
    NotFound(String),

    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("File not found or is not a regular file: \"{0}\"")]
    NotAFile(String),

    #[error("\"{0}\" is not a Python file.")]
    InvalidFileType(String),

    #[error("execution timed out after {0} seconds")]
    Timeout(u64),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl ToolError {
    /// Attach the attempted action to a containment failure
    pub fn from_containment(err: ContainmentError, action: &'static str) -> Self {
        match err {
            ContainmentError::PathEscape(path) => Self::PathEscape { action, path },
            other => Self::Containment(other),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Render a handler outcome as the text the model receives
pub fn render_result(result: ToolResult) -> String {
    match result {
        Ok(output) => output,
        Err(e) => format!("Error: {e}"),
    }
}
