use serde_json::Value;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::conversation::ToolCall;

/// Per-session log file; every line carries the session it belongs to
struct SessionLog {
    session_id: String,
    file: File,
}

static SESSION_LOG: Mutex<Option<SessionLog>> = Mutex::new(None);

/// Initialize logging system
/// - Console logging is ONLY enabled when RUST_LOG is set
/// - File logging is enabled when AGENTBOX_LOG_TO_FILE is set (per-session setup later)
pub fn init_logging() {
    let rust_log_present = env::var("RUST_LOG").is_ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if rust_log_present {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
    } else {
        tracing_subscriber::registry().with(env_filter).init();
    }
}

/// Open `~/.agentbox/sessions/<id>.log` for this run
///
/// Does nothing unless AGENTBOX_LOG_TO_FILE is set.
pub fn setup_session_file_logging(session_id: &str) -> anyhow::Result<()> {
    if env::var("AGENTBOX_LOG_TO_FILE").is_err() {
        return Ok(());
    }

    let sessions_dir = get_sessions_dir()?;
    std::fs::create_dir_all(&sessions_dir)?;

    let log_file_path = sessions_dir.join(format!("{}.log", session_id));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    if let Ok(mut guard) = SESSION_LOG.lock() {
        *guard = Some(SessionLog {
            session_id: session_id.to_string(),
            file,
        });
    }

    log_info(&format!(
        "File logging enabled: {}",
        log_file_path.display()
    ));

    Ok(())
}

fn get_sessions_dir() -> anyhow::Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home_dir.join(".agentbox").join("sessions"))
}

fn format_log_line(timestamp: &str, level: &str, session_id: &str, msg: &str) -> String {
    format!("[{}] [{}] [session {}] {}", timestamp, level, session_id, msg)
}

fn write_to_file(level: &str, msg: &str) {
    if let Ok(mut guard) = SESSION_LOG.lock()
        && let Some(log) = guard.as_mut()
    {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let line = format_log_line(&timestamp, level, &log.session_id, msg);
        let _ = writeln!(log.file, "{}", line);
        let _ = log.file.flush();
    }
}

pub fn log_error(msg: &str) {
    error!("{msg}");
    write_to_file("ERROR", msg);
}

pub fn log_warn(msg: &str) {
    warn!("{msg}");
    write_to_file("WARN", msg);
}

pub fn log_info(msg: &str) {
    info!("{msg}");
    write_to_file("INFO", msg);
}

pub fn log_debug(msg: &str) {
    debug!("{msg}");
    write_to_file("DEBUG", msg);
}

/// The stdout line printed when a tool is about to run
fn tool_call_line(call: &ToolCall, verbose: bool) -> String {
    if verbose {
        format!("Calling function: {}({})", call.name, call.arguments)
    } else {
        format!(" - Calling function: {}", call.name)
    }
}

/// Announce a tool call on stdout and record it in the logs
pub fn trace_tool_call(call: &ToolCall, verbose: bool) {
    println!("{}", tool_call_line(call, verbose));
    info!(tool = %call.name, call_id = %call.call_id, "Executing tool");
    debug!(tool = %call.name, arguments = %call.arguments, "Tool arguments");
    write_to_file(
        "INFO",
        &format!("Executing tool: {} (call_id: {})", call.name, call.call_id),
    );
}

/// Record the payload sent back to the model, echoing it on stdout when verbose
pub fn trace_tool_result(call: &ToolCall, payload: &Value, verbose: bool) {
    if verbose {
        println!("-> {}", payload);
    }
    debug!(tool = %call.name, call_id = %call.call_id, %payload, "Tool response");
    write_to_file(
        "DEBUG",
        &format!("Tool response for {}: {}", call.call_id, payload),
    );
}
