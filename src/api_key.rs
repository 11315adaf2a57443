use anyhow::Result;
use std::env;

use crate::constants::GEMINI_API_KEY_URL;
use crate::logging::{log_error, log_info, log_warn};

const GEMINI_DOCS_URL: &str = "https://ai.google.dev/gemini-api/docs/api-key";

pub fn get_api_key() -> Result<String> {
    match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            log_info("Found GEMINI_API_KEY environment variable");
            Ok(key)
        }
        Ok(_) => {
            log_error("GEMINI_API_KEY environment variable is empty");
            handle_api_key_error()
        }
        Err(_) => {
            log_error("GEMINI_API_KEY environment variable not found");
            handle_api_key_error()
        }
    }
}

fn handle_api_key_error() -> Result<String> {
    eprintln!();
    eprintln!("🔑 API Key Required");
    eprintln!("===================");
    eprintln!();
    eprintln!("The Google Gemini API key is missing or empty.");
    eprintln!();
    eprintln!("Get a key at {} and export it, or put it in a .env file:", GEMINI_API_KEY_URL);
    eprintln!();
    eprintln!("  export GEMINI_API_KEY=\"your_api_key_here\"");
    eprintln!();
    eprintln!("📚 Documentation: {}", GEMINI_DOCS_URL);
    eprintln!();

    Err(anyhow::anyhow!(
        "GEMINI_API_KEY environment variable is required. Visit {} to get your API key.",
        GEMINI_API_KEY_URL
    ))
}

pub fn validate_api_key_format(api_key: &str) -> bool {
    // Google API keys start with "AIza" and are 39 characters long
    if api_key.len() != 39 {
        log_warn("API key length is not 39 characters (expected for Google API keys)");
        return false;
    }

    if !api_key.starts_with("AIza") {
        log_warn("API key does not start with 'AIza' (expected for Google API keys)");
        return false;
    }

    if !api_key.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        log_warn("API key contains invalid characters");
        return false;
    }

    true
}
