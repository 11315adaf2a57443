use serde_json::{Map, Value, json};

use crate::conversation::{ToolCall, ToolResponse};
use crate::logging::{log_error, log_info, log_warn, trace_tool_call, trace_tool_result};

use super::path_guard::Root;
use super::registry::{ToolRegistry, ToolSpec};
use super::render_result;

/// Argument key the model must never control
const ROOT_ARGUMENT: &str = "working_directory";

/// Turns model tool calls into tool responses
///
/// Holds the session's root and passes it explicitly to every handler.
pub struct ToolDispatcher {
    registry: ToolRegistry,
    root: Root,
    verbose: bool,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry, root: Root, verbose: bool) -> Self {
        Self {
            registry,
            root,
            verbose,
        }
    }

    /// Execute a single tool call
    ///
    /// Never fails: unknown tools and handler errors both come back as payloads.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResponse {
        trace_tool_call(call, self.verbose);

        let payload = match self.registry.get(&call.name) {
            Some(tool) => {
                let result = tool.execute(prepare_arguments(&call.arguments), &self.root).await;
                match &result {
                    Ok(output) => log_info(&format!(
                        "Tool {} succeeded, output length: {}",
                        call.name,
                        output.len()
                    )),
                    Err(e) => log_warn(&format!("Tool {} failed: {}", call.name, e)),
                }
                json!({ "result": render_result(result) })
            }
            None => {
                log_error(&format!("Unknown tool requested: {}", call.name));
                json!({ "error": format!("Unknown function: {}", call.name) })
            }
        };

        trace_tool_result(call, &payload, self.verbose);

        ToolResponse {
            call_id: call.call_id.clone(),
            name: call.name.clone(),
            payload,
        }
    }

    /// Tool declarations advertised to the model
    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.registry.catalog()
    }
}

/// Copy the model's arguments, dropping anything that tries to pick the root
fn prepare_arguments(arguments: &Value) -> Value {
    let mut args = match arguments {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    if args.remove(ROOT_ARGUMENT).is_some() {
        log_warn("Ignoring model-supplied working_directory argument");
    }
    Value::Object(args)
}
