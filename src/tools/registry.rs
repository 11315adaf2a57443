use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::implementations::{GetFileContentTool, GetFilesInfoTool, RunPythonFileTool, WriteFileTool};
use super::path_guard::Root;
use super::script::ScriptRunner;
use super::ToolResult;

/// Declaration of a tool as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the model-supplied arguments
    pub parameters: Value,
}

/// Trait for implementing agent tools
///
/// Each tool declares its name, description and JSON schema, and executes
/// against a root it is handed explicitly. The root never appears in the schema.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Tool name (e.g., "get_file_content")
    fn name(&self) -> &str;

    /// Human-readable description for the LLM
    fn description(&self) -> &str;

    /// JSON Schema for parameters
    fn schema(&self) -> Value;

    /// Execute the tool with the model's arguments inside `root`
    async fn execute(&self, args: Value, root: &Root) -> ToolResult;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema(),
        }
    }
}

/// Registry of available tools, keyed by name
///
/// Names are kept sorted so the advertised catalog is stable.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn AgentTool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// The four project tools
    pub fn with_defaults(runner: ScriptRunner) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(GetFilesInfoTool));
        registry.register(Box::new(GetFileContentTool));
        registry.register(Box::new(WriteFileTool));
        registry.register(Box::new(RunPythonFileTool::new(runner)));
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Box<dyn AgentTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AgentTool> {
        self.tools.get(name).map(|b| b.as_ref())
    }

    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|tool| tool.spec()).collect()
    }

}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults(ScriptRunner::default())
    }
}
