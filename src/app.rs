use anyhow::{Context, Result};

use crate::agent::{AgentLoop, AgentRun, LoopOutcome};
use crate::api_key::get_api_key;
use crate::cli::Config;
use crate::logging::{log_info, setup_session_file_logging};
use crate::output::print_verbose_summary;
use crate::prompts::SYSTEM_PROMPT;
use crate::provider::{ProviderConfig, ProviderFactory, requires_api_key};
use crate::tools::{Root, ScriptRunner, ToolDispatcher, ToolRegistry};

pub async fn run_app(config: Config) -> Result<()> {
    let session_id = uuid::Uuid::new_v4().to_string();

    // Setup file logging for this session if AGENTBOX_LOG_TO_FILE is set
    setup_session_file_logging(&session_id)
        .context("Failed to setup session file logging")?;
    log_info(&format!("Starting session {}", session_id));

    // The root comes from configuration only and is fixed for the whole run
    let root = Root::new(&config.root_dir).context("Invalid working directory")?;
    log_info(&format!("Tools are confined to {}", root.path().display()));

    let dispatcher = build_dispatcher(&config, root);

    // Only hosted providers need a key; a local Ollama server does not
    let api_key = if requires_api_key(&config.model) {
        Some(get_api_key().context("Failed to get API key")?)
    } else {
        None
    };
    let session = ProviderFactory::create_session(ProviderConfig {
        model: config.model.clone(),
        api_key,
    })
    .context("Failed to initialize model session")?;

    let mut agent = AgentLoop::new(session, dispatcher, SYSTEM_PROMPT);
    let run = agent.run(&config.prompt).await?;

    report_run(&config, &run);
    Ok(())
}

pub fn build_dispatcher(config: &Config, root: Root) -> ToolDispatcher {
    let registry = ToolRegistry::with_defaults(ScriptRunner::new(config.python.clone()));
    ToolDispatcher::new(registry, root, config.verbose)
}

fn report_run(config: &Config, run: &AgentRun) {
    match run.outcome {
        LoopOutcome::Answered => log_info(&format!(
            "Session finished with an answer after {} iteration(s)",
            run.iterations
        )),
        LoopOutcome::NoCandidate => log_info(&format!(
            "Session finished without a candidate after {} iteration(s)",
            run.iterations
        )),
        LoopOutcome::Exhausted => log_info(&format!(
            "Session stopped at the iteration limit ({} iterations)",
            run.iterations
        )),
    }

    if config.verbose {
        print_verbose_summary(&config.prompt, &run.usage);
    }
}
