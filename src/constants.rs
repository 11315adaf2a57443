/// Default model constants
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Get default model from environment variable or default
pub fn get_default_model() -> String {
    std::env::var("AGENTBOX_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

/// Local model used for `ollama::` without an explicit model name
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Get the Ollama server address from environment variable or default
pub fn get_ollama_base_url() -> String {
    std::env::var("AGENTBOX_OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_string())
}

/// Local models can be slow to answer
pub const OLLAMA_TIMEOUT_SECS: u64 = 300;

/// Directory the tools are confined to, relative to the current directory
pub const DEFAULT_ROOT_DIR: &str = "calculator";

/// Get the tool root directory from environment variable or default
pub fn get_root_dir() -> String {
    std::env::var("AGENTBOX_ROOT").unwrap_or_else(|_| DEFAULT_ROOT_DIR.to_string())
}

/// Interpreter used by `run_python_file`
pub const DEFAULT_PYTHON: &str = "python3";

pub fn get_python_interpreter() -> String {
    std::env::var("AGENTBOX_PYTHON").unwrap_or_else(|_| DEFAULT_PYTHON.to_string())
}

/// Agent loop constants
pub const MAX_ITERATIONS: usize = 20;

/// Tool limits
pub const MAX_FILE_CHARS: usize = 10_000;
pub const SCRIPT_TIMEOUT_SECS: u64 = 30;
pub const SCRIPT_EXTENSION: &str = ".py";

/// URLs for user guidance
pub const GEMINI_API_KEY_URL: &str = "https://makersuite.google.com/app/apikey";
