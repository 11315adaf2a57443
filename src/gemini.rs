use crate::api_key::validate_api_key_format;
use crate::constants::GEMINI_API_KEY_URL;
use crate::conversation::{ConversationHistory, ToolCall, Turn};
use crate::logging::{log_debug, log_error, log_info, log_warn};
use crate::provider::{LlmSession, ModelReply, ReplyPart, TokenUsage};
use crate::tools::ToolSpec;
use anyhow::{Context, Result};
use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest, ChatResponse, ContentPart, Tool, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};

/// Gemini chat session driven through genai
pub struct GeminiSession {
    api_key: String,
    model: String,
    /// Tool calls exactly as the API issued them, replayed verbatim in later requests
    issued_calls: Vec<genai::chat::ToolCall>,
}

impl GeminiSession {
    pub fn new(model: String, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("No API key provided"));
        }

        if !validate_api_key_format(&api_key) {
            log_warn("API key format validation failed, continuing anyway");
            eprintln!("⚠️  Warning: API key format seems incorrect.");
            eprintln!("   Expected format: AIzaSy... (39 characters)");
        }

        log_info(&format!("Initializing Gemini session with model: {}", model));

        Ok(Self {
            api_key,
            model,
            issued_calls: Vec::new(),
        })
    }

    fn client(&self) -> Client {
        let api_key = self.api_key.clone();
        let auth_resolver = AuthResolver::from_resolver_fn(move |_model_iden| {
            Ok(Some(AuthData::from_single(api_key.clone())))
        });

        Client::builder().with_auth_resolver(auth_resolver).build()
    }

    /// Rebuild the genai message list from the history
    ///
    /// Consecutive tool calls belong to one model turn and are sent together.
    fn to_chat_messages(&self, history: &ConversationHistory) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::with_capacity(history.len());
        let mut pending_calls: Vec<genai::chat::ToolCall> = Vec::new();

        for turn in history.turns() {
            if let Turn::ModelToolCall(call) = turn {
                pending_calls.push(self.issued_call(call)?);
                continue;
            }
            if !pending_calls.is_empty() {
                messages.push(ChatMessage::from(std::mem::take(&mut pending_calls)));
            }

            match turn {
                Turn::User(text) => messages.push(ChatMessage::user(text.clone())),
                Turn::ModelText(text) => messages.push(ChatMessage::assistant(text.clone())),
                Turn::Tool(response) => messages.push(ChatMessage::from(ToolResponse::new(
                    response.call_id.clone(),
                    response.payload.to_string(),
                ))),
                Turn::ModelToolCall(_) => {}
            }
        }

        if !pending_calls.is_empty() {
            messages.push(ChatMessage::from(pending_calls));
        }

        Ok(messages)
    }

    fn issued_call(&self, call: &ToolCall) -> Result<genai::chat::ToolCall> {
        self.issued_calls
            .iter()
            .find(|issued| issued.call_id == call.call_id && issued.fn_arguments == call.arguments)
            .cloned()
            .with_context(|| {
                format!(
                    "Tool call {} ({}) was not issued by this session",
                    call.call_id, call.name
                )
            })
    }

    fn to_genai_tools(tools: &[ToolSpec]) -> Vec<Tool> {
        tools
            .iter()
            .map(|spec| {
                Tool::new(spec.name.clone())
                    .with_description(spec.description.clone())
                    .with_schema(spec.parameters.clone())
            })
            .collect()
    }

    /// Log chat request structure
    fn log_chat_request_structure(messages: &[ChatMessage]) {
        log_debug("=== Chat Request Structure ===");
        log_debug(&format!("Total Messages: {}", messages.len()));

        for (i, msg) in messages.iter().enumerate() {
            log_debug(&format!("Message {}: {:?}", i + 1, msg.role));
            for (j, part) in msg.content.parts().iter().enumerate() {
                log_debug(&format!("  Part {}: {:?}", j + 1, part));
            }
        }
        log_debug("=== End Chat Request Structure ===");
    }

    fn parse_response(&mut self, chat_response: ChatResponse) -> Option<ModelReply> {
        let usage = TokenUsage {
            prompt_tokens: chat_response.usage.prompt_tokens.map(|t| t as u32),
            completion_tokens: chat_response.usage.completion_tokens.map(|t| t as u32),
            total_tokens: chat_response.usage.total_tokens.map(|t| t as u32),
        };

        let mut parts = Vec::new();
        for part in chat_response.content.parts().iter() {
            match part {
                ContentPart::Text(text) => parts.push(ReplyPart::Text(text.clone())),
                ContentPart::ToolCall(tool_call) => {
                    parts.push(ReplyPart::ToolCall(ToolCall::new(
                        tool_call.call_id.clone(),
                        tool_call.fn_name.clone(),
                        tool_call.fn_arguments.clone(),
                    )));
                    self.issued_calls.push(tool_call.clone());
                }
                other => log_debug(&format!("Ignoring response part: {:?}", other)),
            }
        }

        if parts.is_empty() {
            log_warn("Gemini response contained no candidate content");
            return None;
        }

        log_info(&format!(
            "Received response from Gemini API with {} part(s), tokens: {}",
            parts.len(),
            usage.format_short()
        ));

        Some(ModelReply { parts, usage })
    }

    fn report_auth_error(error_text: &str) {
        eprintln!();
        eprintln!("🔐 Authentication Error");
        eprintln!("========================");
        eprintln!();
        eprintln!("The Gemini API rejected your request due to authentication issues.");
        eprintln!();
        eprintln!("Error details: {error_text}");
        eprintln!();
        eprintln!("Verify your API key at: {GEMINI_API_KEY_URL}");
        eprintln!();
    }
}

#[async_trait]
impl LlmSession for GeminiSession {
    async fn generate(
        &mut self,
        history: &ConversationHistory,
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Option<ModelReply>> {
        let messages = self.to_chat_messages(history)?;
        Self::log_chat_request_structure(&messages);

        let chat_request = ChatRequest::new(messages)
            .with_system(system_instruction)
            .with_tools(Self::to_genai_tools(tools));
        log_debug(&format!("Request Debug: {:?}", chat_request));

        let chat_response = match self
            .client()
            .exec_chat(&self.model, chat_request, None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let error_debug = format!("{:?}", e);
                let error_debug_lower = error_debug.to_lowercase();
                log_error(&format!("Gemini request failed: {}", e));
                log_debug(&format!("Raw genai error debug: {}", error_debug));

                if error_debug.contains("401")
                    || error_debug.contains("403")
                    || error_debug_lower.contains("authentication")
                    || error_debug_lower.contains("permission")
                {
                    Self::report_auth_error(&e.to_string());
                }
                return Err(e).context("Failed to send chat request to Gemini API");
            }
        };

        log_debug(&format!("Response Debug: {:?}", chat_response));
        Ok(self.parse_response(chat_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}
