/// Tool implementations
///
/// All tools follow the same pattern:
/// 1. Parse arguments from JSON
/// 2. Hand them, with the trusted root, to the matching handler
/// 3. Return the handler's result unchanged
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::files::{list_directory, read_file, write_file};
use super::path_guard::Root;
use super::registry::AgentTool;
use super::script::ScriptRunner;
use super::{ToolError, ToolResult};

fn parse_args<T: DeserializeOwned>(tool: &'static str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

// ============================================================================
// GetFilesInfoTool
// ============================================================================

#[derive(Deserialize)]
struct GetFilesInfoArgs {
    #[serde(default)]
    directory: Option<String>,
}

pub struct GetFilesInfoTool;

#[async_trait]
impl AgentTool for GetFilesInfoTool {
    fn name(&self) -> &str {
        "get_files_info"
    }

    fn description(&self) -> &str {
        "Lists files and directories within a specified directory or the working directory, \
         along with their sizes. Paths should be relative to the working directory."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory to list files from, relative to the working directory. If not provided, lists the working directory itself."
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value, root: &Root) -> ToolResult {
        let args: GetFilesInfoArgs = parse_args("get_files_info", args)?;
        list_directory(root, args.directory.as_deref()).await
    }
}

// ============================================================================
// GetFileContentTool
// ============================================================================

#[derive(Deserialize)]
struct GetFileContentArgs {
    file_path: String,
}

pub struct GetFileContentTool;

#[async_trait]
impl AgentTool for GetFileContentTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Gets the content of a file, truncated to the first 10000 characters. \
         The path must be relative to the working directory."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to read, relative to the working directory."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, root: &Root) -> ToolResult {
        let args: GetFileContentArgs = parse_args("get_file_content", args)?;
        read_file(root, &args.file_path).await
    }
}

// ============================================================================
// WriteFileTool
// ============================================================================

#[derive(Deserialize)]
struct WriteFileArgs {
    file_path: String,
    content: String,
}

pub struct WriteFileTool;

#[async_trait]
impl AgentTool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file relative to the working directory. \
         Creates the file if it doesn't exist, overwrites it if it does. \
         Parent directories must already exist."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to write, relative to the working directory."
                },
                "content": {
                    "type": "string",
                    "description": "The content to write into the file."
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, args: Value, root: &Root) -> ToolResult {
        let args: WriteFileArgs = parse_args("write_file", args)?;
        write_file(root, &args.file_path, &args.content).await
    }
}

// ============================================================================
// RunPythonFileTool
// ============================================================================

#[derive(Deserialize)]
struct RunPythonFileArgs {
    file_path: String,
}

pub struct RunPythonFileTool {
    runner: ScriptRunner,
}

impl RunPythonFileTool {
    pub fn new(runner: ScriptRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl AgentTool for RunPythonFileTool {
    fn name(&self) -> &str {
        "run_python_file"
    }

    fn description(&self) -> &str {
        "Executes a Python file inside the working directory and returns its standard output, \
         standard error and exit code. Execution is stopped after 30 seconds."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The Python script to execute, relative to the working directory, e.g. 'main.py' or 'pkg/tests.py'."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value, root: &Root) -> ToolResult {
        let args: RunPythonFileArgs = parse_args("run_python_file", args)?;
        self.runner.run(root, &args.file_path).await
    }
}
