use crate::constants::{get_default_model, get_python_interpreter, get_root_dir};
use crate::logging::log_info;
use clap::error::ErrorKind;
use clap::{Arg, Command};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Clap(#[from] clap::Error),
    #[error("Error: Prompt must be the first argument (got \"{0}\")")]
    FlagLikePrompt(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub prompt: String,
    pub verbose: bool,
    pub model: String,
    /// Directory the tools are confined to, as configured (not yet validated)
    pub root_dir: String,
    pub python: String,
}

impl Config {
    /// Parse the process arguments, exiting on usage errors
    ///
    /// Help and version exit with 0, every other argument problem with 1.
    pub fn from_args() -> Self {
        match Self::parse_from(std::env::args_os()) {
            Ok(config) => config,
            Err(CliError::Clap(e))
                if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                e.exit()
            }
            Err(CliError::Clap(e)) => {
                let _ = e.print();
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::build_cli().try_get_matches_from(args)?;

        let prompt = matches
            .get_one::<String>("prompt")
            .cloned()
            .unwrap_or_default();
        if prompt.starts_with('-') {
            return Err(CliError::FlagLikePrompt(prompt));
        }

        let config = Config {
            prompt,
            verbose: matches.get_flag("verbose"),
            model: get_default_model(),
            root_dir: get_root_dir(),
            python: get_python_interpreter(),
        };

        log_info(&format!(
            "Parsed config: verbose={}, model={}, root={}, python={}",
            config.verbose, config.model, config.root_dir, config.python
        ));

        Ok(config)
    }

    fn build_cli() -> Command {
        Command::new("agentbox")
            .version(env!("AGENTBOX_VERSION"))
            .about("Coding agent that works on a sandboxed project directory using Google Gemini or Ollama")
            .after_help(
                "Environment:\n  \
                 GEMINI_API_KEY        API key for Google Gemini (not needed for ollama::)\n  \
                 AGENTBOX_MODEL        Model to use, e.g. ollama::qwen2.5-coder:7b (default: gemini-2.0-flash-001)\n  \
                 AGENTBOX_OLLAMA_URL   Ollama server (default: http://localhost:11434)\n  \
                 AGENTBOX_ROOT         Directory the agent may touch (default: ./calculator)\n  \
                 AGENTBOX_PYTHON       Interpreter for run_python_file (default: python3)\n  \
                 AGENTBOX_LOG_TO_FILE  Also write logs to ~/.agentbox/sessions/<id>.log",
            )
            .arg(
                Arg::new("prompt")
                    .help("Request for the agent, e.g. \"fix the bug in main.py\"")
                    .value_name("PROMPT")
                    .required(true),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Show tool arguments, tool results and token usage")
                    .action(clap::ArgAction::SetTrue),
            )
    }
}
