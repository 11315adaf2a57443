use crate::constants::OLLAMA_TIMEOUT_SECS;
use crate::conversation::{ConversationHistory, Role, ToolCall, Turn};
use crate::logging::{log_debug, log_error, log_info, log_warn};
use crate::provider::{LlmSession, ModelReply, ReplyPart, TokenUsage};
use crate::tools::ToolSpec;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl OllamaMessage {
    fn text(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    tools: Vec<OllamaTool<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaResponseMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<OllamaToolCall>,
}

/// Session against a local Ollama server's chat API
#[derive(Debug)]
pub struct OllamaSession {
    base_url: String,
    model: String,
    client: reqwest::Client,
    /// Ollama does not number tool calls, so ids are assigned here
    issued_calls: usize,
}

impl OllamaSession {
    pub fn new(model: String, base_url: String) -> Result<Self> {
        log_info(&format!(
            "Initializing Ollama session with model: {} at {}",
            model, base_url
        ));

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(OLLAMA_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
            issued_calls: 0,
        })
    }

    /// Rebuild the Ollama message list from the history
    ///
    /// The calls of one model turn are merged into a single assistant message.
    fn to_ollama_messages(history: &ConversationHistory, system_instruction: &str) -> Vec<OllamaMessage> {
        let mut messages = vec![OllamaMessage::text("system", system_instruction)];

        for turn in history.turns() {
            let role = role_name(turn.role());
            match turn {
                Turn::User(text) | Turn::ModelText(text) => {
                    messages.push(OllamaMessage::text(role, text.clone()))
                }
                Turn::ModelToolCall(call) => {
                    let tool_call = OllamaToolCall {
                        function: OllamaFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    };
                    let same_turn = messages
                        .last()
                        .is_some_and(|last| last.role == role && !last.tool_calls.is_empty());
                    match messages.last_mut() {
                        Some(last) if same_turn => last.tool_calls.push(tool_call),
                        _ => messages.push(OllamaMessage {
                            tool_calls: vec![tool_call],
                            ..OllamaMessage::text(role, "")
                        }),
                    }
                }
                Turn::Tool(response) => messages.push(OllamaMessage {
                    tool_name: Some(response.name.clone()),
                    ..OllamaMessage::text(role, response.payload.to_string())
                }),
            }
        }

        messages
    }

    fn parse_response(&mut self, chat_response: OllamaChatResponse) -> Option<ModelReply> {
        if !chat_response.done {
            log_warn("Received incomplete response from Ollama");
        }

        let usage = TokenUsage {
            prompt_tokens: chat_response.prompt_eval_count,
            completion_tokens: chat_response.eval_count,
            total_tokens: chat_response
                .prompt_eval_count
                .zip(chat_response.eval_count)
                .map(|(p, c)| p + c),
        };

        let message = chat_response.message?;
        let mut parts = Vec::new();
        if !message.content.trim().is_empty() {
            parts.push(ReplyPart::Text(message.content));
        }
        for tool_call in message.tool_calls {
            self.issued_calls += 1;
            parts.push(ReplyPart::ToolCall(ToolCall::new(
                format!("ollama-call-{}", self.issued_calls),
                tool_call.function.name,
                tool_call.function.arguments,
            )));
        }

        if parts.is_empty() {
            log_warn("Ollama response contained no content");
            return None;
        }

        log_info(&format!(
            "Received response from Ollama API with {} part(s), tokens: {}",
            parts.len(),
            usage.format_short()
        ));

        Some(ModelReply { parts, usage })
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
        Role::Tool => "tool",
    }
}

#[async_trait]
impl LlmSession for OllamaSession {
    async fn generate(
        &mut self,
        history: &ConversationHistory,
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Option<ModelReply>> {
        let endpoint = format!("{}/api/chat", self.base_url);
        let request_body = OllamaChatRequest {
            model: &self.model,
            messages: Self::to_ollama_messages(history, system_instruction),
            tools: tools
                .iter()
                .map(|spec| OllamaTool {
                    kind: "function",
                    function: spec,
                })
                .collect(),
            stream: false,
        };

        log_debug(&format!(
            "Sending chat request to Ollama API with {} message(s)",
            request_body.messages.len()
        ));

        let response = self
            .client
            .post(&endpoint)
            .json(&request_body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Ollama API at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log_error(&format!("Ollama API error: {} - {}", status, error_text));
            return Err(anyhow::anyhow!(
                "Ollama API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;
        log_debug(&format!("Received response from Ollama: {:?}", chat_response));

        Ok(self.parse_response(chat_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ToolResponse;
    use serde_json::json;

    fn session() -> OllamaSession {
        OllamaSession::new(
            "qwen2.5-coder:7b".to_string(),
            "http://localhost:11434/".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = session();
        assert_eq!(session.model_name(), "qwen2.5-coder:7b");
        assert_eq!(session.provider_name(), "Ollama");
        assert_eq!(session.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_history_conversion() {
        let mut history = ConversationHistory::new("run the tests");
        for (id, file) in [("c1", "tests.py"), ("c2", "main.py")] {
            history.push(Turn::ModelToolCall(ToolCall::new(
                id,
                "run_python_file",
                json!({ "file_path": file }),
            )));
        }
        for id in ["c1", "c2"] {
            history.push(Turn::Tool(ToolResponse {
                call_id: id.to_string(),
                name: "run_python_file".to_string(),
                payload: json!({ "result": "STDOUT:\nok" }),
            }));
        }

        let messages = OllamaSession::to_ollama_messages(&history, "be careful");
        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool", "tool"]);
        assert_eq!(messages[0].content, "be careful");
        assert_eq!(messages[2].tool_calls.len(), 2);
        assert_eq!(messages[3].tool_name.as_deref(), Some("run_python_file"));
        assert_eq!(messages[3].content, r#"{"result":"STDOUT:\nok"}"#);
    }

    #[test]
    fn test_request_serialization() {
        let specs = crate::tools::ToolRegistry::default().catalog();
        let request = OllamaChatRequest {
            model: "qwen2.5-coder:7b",
            messages: vec![OllamaMessage::text("user", "hi")],
            tools: specs
                .iter()
                .map(|spec| OllamaTool {
                    kind: "function",
                    function: spec,
                })
                .collect(),
            stream: false,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0], json!({ "role": "user", "content": "hi" }));
        assert_eq!(value["tools"][0]["type"], "function");
        assert_eq!(value["tools"][0]["function"]["name"], "get_file_content");
        assert_eq!(value["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_parse_tool_calls_and_usage() {
        let mut session = session();
        let response: OllamaChatResponse = serde_json::from_value(json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    { "function": { "name": "get_files_info", "arguments": {} } },
                    { "function": { "name": "get_file_content", "arguments": { "file_path": "main.py" } } }
                ]
            },
            "done": true,
            "prompt_eval_count": 200,
            "eval_count": 20
        }))
        .unwrap();

        let reply = session.parse_response(response).unwrap();
        assert_eq!(
            reply.parts,
            vec![
                ReplyPart::ToolCall(ToolCall::new("ollama-call-1", "get_files_info", json!({}))),
                ReplyPart::ToolCall(ToolCall::new(
                    "ollama-call-2",
                    "get_file_content",
                    json!({ "file_path": "main.py" })
                )),
            ]
        );
        assert_eq!(reply.usage.format_short(), "200+20=220");
    }

    #[test]
    fn test_parse_text_and_empty() {
        let mut session = session();
        let text: OllamaChatResponse = serde_json::from_value(json!({
            "message": { "role": "assistant", "content": "The bug is fixed." },
            "done": true
        }))
        .unwrap();
        assert_eq!(
            session.parse_response(text).unwrap().parts,
            vec![ReplyPart::Text("The bug is fixed.".to_string())]
        );

        let blank: OllamaChatResponse = serde_json::from_value(json!({
            "message": { "role": "assistant", "content": "  " },
            "done": true
        }))
        .unwrap();
        assert!(session.parse_response(blank).is_none());

        let no_message: OllamaChatResponse =
            serde_json::from_value(json!({ "done": true })).unwrap();
        assert!(session.parse_response(no_message).is_none());
    }
}
