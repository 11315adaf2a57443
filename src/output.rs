use crate::logging::log_info;
use crate::provider::TokenUsage;

pub fn print_response(text: &str) {
    log_info(&format!("Writing response to stdout, length: {}", text.len()));
    println!("Response: {}", text);
}

/// Prompt and token counts, printed after the run in verbose mode
pub fn print_verbose_summary(prompt: &str, usage: &TokenUsage) {
    println!("{}", format_verbose_summary(prompt, usage));
}

fn format_verbose_summary(prompt: &str, usage: &TokenUsage) -> String {
    let count = |tokens: Option<u32>| tokens.map_or_else(|| "N/A".to_string(), |t| t.to_string());
    format!(
        "User prompt: {}\nPrompt tokens: {}\nResponse tokens: {}",
        prompt,
        count(usage.prompt_tokens),
        count(usage.completion_tokens)
    )
}
