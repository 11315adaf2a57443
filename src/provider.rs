use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_OLLAMA_MODEL;
use crate::conversation::{ConversationHistory, ToolCall};
use crate::logging::log_info;
use crate::tools::ToolSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl TokenUsage {
    pub fn format_short(&self) -> String {
        match (
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
        ) {
            (Some(p), Some(c), Some(t)) => format!("{}+{}={}", p, c, t),
            (Some(p), Some(c), None) => format!("{}+{}", p, c),
            (None, None, Some(t)) => format!("{}", t),
            _ => "N/A".to_string(),
        }
    }
}

/// One piece of a model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPart {
    Text(String),
    ToolCall(ToolCall),
}

/// The first candidate of a model response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub parts: Vec<ReplyPart>,
    pub usage: TokenUsage,
}

/// A chat session with a tool-calling model
///
/// `generate` receives the whole history on every call and returns the
/// reply's parts, or `None` when the model produced no candidate.
#[async_trait]
pub trait LlmSession: Send {
    async fn generate(
        &mut self,
        history: &ConversationHistory,
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Option<ModelReply>>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// Get provider-specific information (e.g., "Gemini")
    fn provider_name(&self) -> &str;
}

#[async_trait]
impl LlmSession for Box<dyn LlmSession> {
    async fn generate(
        &mut self,
        history: &ConversationHistory,
        tools: &[ToolSpec],
        system_instruction: &str,
    ) -> Result<Option<ModelReply>> {
        (**self).generate(history, tools, system_instruction).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }
}

/// Configuration for creating LLM sessions
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `provider::model` or just `model` (Gemini)
    pub model: String,
    /// Required for Gemini, unused by Ollama
    pub api_key: Option<String>,
}

/// Split a model string into its lowercase provider and the model name
///
/// Defaults to Gemini when no `provider::` prefix is given.
pub fn split_model(model: &str) -> (String, &str) {
    match model.split_once("::") {
        Some((provider, name)) => (provider.to_lowercase(), name),
        None => ("gemini".to_string(), model),
    }
}

pub fn requires_api_key(model: &str) -> bool {
    split_model(model).0 != "ollama"
}

/// Factory for creating LLM sessions
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_session(config: ProviderConfig) -> Result<Box<dyn LlmSession>> {
        let (provider_name, model_name) = split_model(&config.model);
        log_info(&format!(
            "Creating {} session for model {}",
            provider_name, model_name
        ));

        match provider_name.as_str() {
            "gemini" => {
                let api_key = config
                    .api_key
                    .ok_or_else(|| anyhow::anyhow!("Gemini requires GEMINI_API_KEY"))?;
                let session = crate::gemini::GeminiSession::new(model_name.to_string(), api_key)?;
                Ok(Box::new(session))
            }
            "ollama" => {
                let model_name = if model_name.is_empty() {
                    DEFAULT_OLLAMA_MODEL
                } else {
                    model_name
                };
                let session = crate::ollama::OllamaSession::new(
                    model_name.to_string(),
                    crate::constants::get_ollama_base_url(),
                )?;
                Ok(Box::new(session))
            }
            _ => Err(anyhow::anyhow!(
                "Unsupported provider: {}. Supported providers: gemini, ollama",
                provider_name
            )),
        }
    }
}
