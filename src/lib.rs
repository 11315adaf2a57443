pub mod agent;
pub mod api_key;
pub mod app;
pub mod cli;
pub mod constants;
pub mod conversation;
pub mod gemini;
pub mod logging;
pub mod ollama;
pub mod output;
pub mod prompts;
pub mod provider;
pub mod tools;
