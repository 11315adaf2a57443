use anyhow::Result;

use crate::constants::MAX_ITERATIONS;
use crate::conversation::{ConversationHistory, Turn};
use crate::logging::{log_debug, log_info, log_warn};
use crate::output::print_response;
use crate::provider::{LlmSession, ReplyPart, TokenUsage};
use crate::tools::ToolDispatcher;

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The model replied without requesting any tool
    Answered,
    /// The model returned no candidate content
    NoCandidate,
    /// The iteration cap was reached while the model kept calling tools
    Exhausted,
}

#[derive(Debug)]
pub struct AgentRun {
    pub outcome: LoopOutcome,
    /// Number of model round trips performed
    pub iterations: usize,
    pub history: ConversationHistory,
    pub final_text: Option<String>,
    /// Usage reported with the last reply
    pub usage: TokenUsage,
}

/// Bounded conversation between the model and the tool dispatcher
pub struct AgentLoop<S: LlmSession> {
    session: S,
    dispatcher: ToolDispatcher,
    system_instruction: String,
    max_iterations: usize,
}

impl<S: LlmSession> AgentLoop<S> {
    pub fn new(session: S, dispatcher: ToolDispatcher, system_instruction: impl Into<String>) -> Self {
        Self {
            session,
            dispatcher,
            system_instruction: system_instruction.into(),
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Drive the conversation for one user request
    ///
    /// Session failures end the run with an error; reaching the cap does not.
    pub async fn run(&mut self, prompt: &str) -> Result<AgentRun> {
        let catalog = self.dispatcher.catalog();
        let mut history = ConversationHistory::new(prompt);
        let mut final_text = None;
        let mut usage = TokenUsage::default();
        let mut iterations = 0;

        log_info(&format!(
            "Starting agent loop with {} ({}), {} tool(s), max {} iteration(s)",
            self.session.model_name(),
            self.session.provider_name(),
            catalog.len(),
            self.max_iterations
        ));

        while iterations < self.max_iterations {
            iterations += 1;
            log_debug(&format!(
                "Iteration {}/{} with {} turn(s) in history",
                iterations,
                self.max_iterations,
                history.len()
            ));

            let reply = self
                .session
                .generate(&history, &catalog, &self.system_instruction)
                .await?;

            let Some(reply) = reply.filter(|reply| !reply.parts.is_empty()) else {
                log_info("Model returned no candidate, stopping");
                return Ok(AgentRun {
                    outcome: LoopOutcome::NoCandidate,
                    iterations,
                    history,
                    final_text,
                    usage,
                });
            };
            usage = reply.usage;

            // The model turn is recorded whole before any of its tool responses
            let mut responses = Vec::new();
            for part in reply.parts {
                match part {
                    ReplyPart::ToolCall(call) => {
                        responses.push(self.dispatcher.dispatch(&call).await);
                        history.push(Turn::ModelToolCall(call));
                    }
                    ReplyPart::Text(text) => {
                        print_response(&text);
                        history.push(Turn::ModelText(text.clone()));
                        final_text = Some(text);
                    }
                }
            }

            let called_tool = !responses.is_empty();
            for response in responses {
                history.push(Turn::Tool(response));
            }

            if !called_tool {
                log_info(&format!("Agent answered after {} iteration(s)", iterations));
                return Ok(AgentRun {
                    outcome: LoopOutcome::Answered,
                    iterations,
                    history,
                    final_text,
                    usage,
                });
            }
        }

        log_warn(&format!(
            "Reached the iteration limit of {}, stopping",
            self.max_iterations
        ));
        Ok(AgentRun {
            outcome: LoopOutcome::Exhausted,
            iterations,
            history,
            final_text,
            usage,
        })
    }
}
