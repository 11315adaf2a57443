use anyhow::Result;

use agentbox::app::run_app;
use agentbox::cli::Config;
use agentbox::logging::{init_logging, log_error};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    init_logging();

    let config = Config::from_args();

    if let Err(e) = run_app(config).await {
        log_error(&format!("Session failed: {:#}", e));
        return Err(e);
    }

    Ok(())
}
