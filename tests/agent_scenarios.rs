//! End-to-end agent scenarios against a scripted model
//!
//! The model side is replaced by canned replies; everything from dispatch
//! down to the filesystem and the Python interpreter is real.

use std::collections::VecDeque;
use std::process::Command;
use std::time::Duration;

use agentbox::agent::{AgentLoop, LoopOutcome};
use agentbox::conversation::{ConversationHistory, ToolCall, ToolResponse, Turn};
use agentbox::provider::{LlmSession, ModelReply, ReplyPart, TokenUsage};
use agentbox::tools::{Root, ScriptRunner, ToolDispatcher, ToolRegistry, ToolSpec};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

mod common;

use common::{CALCULATOR_LIB, CALCULATOR_MAIN, TestConfig};

struct ScriptedSession {
    replies: VecDeque<ModelReply>,
    requests: usize,
    advertised: Vec<String>,
}

impl ScriptedSession {
    fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: replies.into(),
            requests: 0,
            advertised: Vec::new(),
        }
    }
}

#[async_trait]
impl LlmSession for ScriptedSession {
    async fn generate(
        &mut self,
        _history: &ConversationHistory,
        tools: &[ToolSpec],
        _system_instruction: &str,
    ) -> Result<Option<ModelReply>> {
        self.requests += 1;
        self.advertised = tools.iter().map(|spec| spec.name.clone()).collect();
        Ok(self.replies.pop_front())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "Test"
    }
}

fn tool_call(id: &str, name: &str, arguments: Value) -> ModelReply {
    ModelReply {
        parts: vec![ReplyPart::ToolCall(ToolCall::new(id, name, arguments))],
        usage: TokenUsage::default(),
    }
}

fn answer(text: &str) -> ModelReply {
    ModelReply {
        parts: vec![ReplyPart::Text(text.to_string())],
        usage: TokenUsage::default(),
    }
}

fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// A `work` root next to a `workspace` sibling and a secret outside both
fn workspace() -> (TestConfig, Root) {
    let config = TestConfig::new();
    config.create_temp_file("work/main.py", CALCULATOR_MAIN);
    config.create_temp_file("work/pkg/calculator.py", CALCULATOR_LIB);
    config.create_temp_file("workspace/other.py", "print('sibling')\n");
    config.create_temp_file("secret.txt", "hunter2");
    let root = Root::new(config.temp_path().join("work")).unwrap();
    (config, root)
}

fn agent(root: Root, runner: ScriptRunner, replies: Vec<ModelReply>) -> AgentLoop<ScriptedSession> {
    let dispatcher = ToolDispatcher::new(ToolRegistry::with_defaults(runner), root, false);
    AgentLoop::new(ScriptedSession::new(replies), dispatcher, "system")
}

fn tool_responses(history: &ConversationHistory) -> Vec<&ToolResponse> {
    history
        .turns()
        .iter()
        .filter_map(|turn| match turn {
            Turn::Tool(response) => Some(response),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_list_root_without_directory() {
    let (config, root) = workspace();
    let pkg_size = std::fs::metadata(config.temp_path().join("work/pkg"))
        .unwrap()
        .len();
    let mut agent = agent(
        root,
        ScriptRunner::default(),
        vec![
            tool_call("c1", "get_files_info", json!({})),
            tool_call("c2", "get_files_info", json!({})),
            answer("Found main.py and pkg"),
        ],
    );

    let run = agent.run("what files are in the project?").await.unwrap();
    assert_eq!(run.outcome, LoopOutcome::Answered);

    let responses = tool_responses(&run.history);
    assert_eq!(
        responses[0].result().unwrap(),
        format!(
            "main.py: file_size={} bytes, is_dir=false\npkg: file_size={} bytes, is_dir=true",
            CALCULATOR_MAIN.len(),
            pkg_size
        )
    );
    // listing an unchanged directory twice is identical
    assert_eq!(responses[0].payload, responses[1].payload);
    assert_eq!(
        agent.session().advertised,
        vec!["get_file_content", "get_files_info", "run_python_file", "write_file"]
    );
}

#[tokio::test]
async fn test_escape_rejected_without_reading() {
    let (_config, root) = workspace();
    let mut agent = agent(
        root,
        ScriptRunner::default(),
        vec![
            tool_call("c1", "get_file_content", json!({ "file_path": "../secret.txt" })),
            tool_call("c2", "get_files_info", json!({ "directory": "../workspace" })),
            tool_call("c3", "write_file", json!({ "file_path": "/tmp/agentbox-pwned.txt", "content": "x" })),
            answer("I cannot access those files"),
        ],
    );

    let run = agent.run("read the secret").await.unwrap();
    let responses = tool_responses(&run.history);

    assert_eq!(
        responses[0].result(),
        Some("Error: Cannot read \"../secret.txt\" as it is outside the permitted working directory")
    );
    assert_eq!(
        responses[1].result(),
        Some("Error: Cannot list \"../workspace\" as it is outside the permitted working directory")
    );
    assert!(responses[2].result().unwrap().starts_with("Error: Cannot write to"));
    assert!(!std::path::Path::new("/tmp/agentbox-pwned.txt").exists());
    for response in responses {
        assert!(!response.result().unwrap_or_default().contains("hunter2"));
    }
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let (config, root) = workspace();
    let content = "def add(a, b):\n    return a + b\n";
    let mut agent = agent(
        root,
        ScriptRunner::default(),
        vec![
            tool_call("c1", "write_file", json!({ "file_path": "pkg/add.py", "content": content })),
            tool_call("c2", "get_file_content", json!({ "file_path": "pkg/add.py" })),
            answer("Wrote pkg/add.py"),
        ],
    );

    let run = agent.run("add an add helper").await.unwrap();
    let responses = tool_responses(&run.history);

    assert_eq!(
        responses[0].result().unwrap(),
        format!(
            "Successfully wrote to \"pkg/add.py\" ({} characters written)",
            content.chars().count()
        )
    );
    assert_eq!(responses[1].result(), Some(content));
    assert_eq!(
        std::fs::read_to_string(config.temp_path().join("work/pkg/add.py")).unwrap(),
        content
    );
}

#[tokio::test]
async fn test_run_script_that_prints_hi() {
    if !python_available() {
        eprintln!("Skipping test: python3 not available");
        return;
    }
    let (config, root) = workspace();
    config.create_temp_file("work/script.py", "print('hi')\n");

    let mut agent = agent(
        root,
        ScriptRunner::default(),
        vec![
            tool_call("c1", "run_python_file", json!({ "file_path": "script.py" })),
            tool_call("c2", "run_python_file", json!({ "file_path": "main.py" })),
            answer("Both scripts ran"),
        ],
    );

    let run = agent.run("run the scripts").await.unwrap();
    let responses = tool_responses(&run.history);

    assert_eq!(responses[0].result(), Some("STDOUT:\nhi"));
    assert!(responses[1].result().unwrap().starts_with("STDOUT:\nCalculator App"));
}

#[tokio::test]
async fn test_timeout_does_not_stop_the_loop() {
    if !python_available() {
        eprintln!("Skipping test: python3 not available");
        return;
    }
    let (config, root) = workspace();
    config.create_temp_file("work/slow.py", "import time\ntime.sleep(5)\n");

    let runner = ScriptRunner::default().with_timeout(Duration::from_secs(1));
    let mut agent = agent(
        root,
        runner,
        vec![
            tool_call("c1", "run_python_file", json!({ "file_path": "slow.py" })),
            answer("The script hangs"),
        ],
    );

    let run = agent.run("why is slow.py slow?").await.unwrap();
    assert_eq!(run.outcome, LoopOutcome::Answered);
    assert_eq!(
        tool_responses(&run.history)[0].result(),
        Some("Error: execution timed out after 1 seconds")
    );
}

#[tokio::test]
async fn test_twenty_one_tool_calls_stop_after_twenty() {
    let (_config, root) = workspace();
    let replies = (0..21)
        .map(|i| tool_call(&format!("c{}", i), "get_files_info", json!({})))
        .collect();
    let mut agent = agent(root, ScriptRunner::default(), replies);

    let run = agent.run("keep listing").await.unwrap();

    assert_eq!(run.outcome, LoopOutcome::Exhausted);
    assert_eq!(run.iterations, 20);
    assert_eq!(agent.session().requests, 20);
    assert_eq!(tool_responses(&run.history).len(), 20);
    assert!(run.final_text.is_none());
}
