//! Common utilities for agentbox integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test configuration for integration tests
pub struct TestConfig {
    pub temp_dir: TempDir,
    pub agentbox_binary: PathBuf,
}

impl TestConfig {
    /// Create a new test configuration with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        Self {
            temp_dir,
            agentbox_binary: PathBuf::from(env!("CARGO_BIN_EXE_agentbox")),
        }
    }

    /// Get the path to the temporary directory
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temporary file with given content and return its path
    pub fn create_temp_file(&self, name: &str, content: &str) -> PathBuf {
        let file_path = self.temp_path().join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write temp file");
        file_path
    }

    /// Create a directory inside the temporary directory and return its path
    pub fn create_dir(&self, name: &str) -> PathBuf {
        let dir_path = self.temp_path().join(name);
        fs::create_dir_all(&dir_path).expect("Failed to create temp directory");
        dir_path
    }

    /// Create a command to run agentbox from inside the temporary directory
    ///
    /// Inherited agentbox configuration is cleared so each test starts from defaults.
    pub fn agentbox_command(&self) -> Command {
        let mut command = Command::new(&self.agentbox_binary);
        command
            .current_dir(self.temp_path())
            .env_remove("AGENTBOX_MODEL")
            .env_remove("AGENTBOX_ROOT")
            .env_remove("AGENTBOX_PYTHON")
            .env_remove("AGENTBOX_OLLAMA_URL")
            .env_remove("AGENTBOX_LOG_TO_FILE")
            .env_remove("RUST_LOG");
        command
    }
}

/// Source of the small calculator project used by the scenario tests
pub const CALCULATOR_MAIN: &str = "\
import sys
from pkg.calculator import Calculator


def main():
    calculator = Calculator()
    if len(sys.argv) <= 1:
        print(\"Calculator App\")
        print('Usage: python main.py \"<expression>\"')
        return
    print(calculator.evaluate(\" \".join(sys.argv[1:])))


if __name__ == \"__main__\":
    main()
";

pub const CALCULATOR_LIB: &str = "\
class Calculator:
    def evaluate(self, expression):
        left, op, right = expression.split()
        if op == \"+\":
            return float(left) + float(right)
        raise ValueError(op)
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::new();
        assert!(config.temp_path().exists());
        assert!(config.agentbox_binary.file_name().is_some());
    }

    #[test]
    fn test_temp_file_creation() {
        let config = TestConfig::new();
        let file_path = config.create_temp_file("pkg/calculator.py", CALCULATOR_LIB);

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), CALCULATOR_LIB);
    }
}
