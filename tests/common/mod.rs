#![allow(dead_code)]

use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper struct to run desk commands in an isolated temp directory
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: String,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_desk").to_string(),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("DESK_DEMO")
            .env_remove("DESK_API_URL")
            .env_remove("DESK_LOG")
            .output()
            .expect("Failed to execute desk command")
    }

    /// Run against the in-memory demo data
    pub fn demo(&self, args: &[&str]) -> Output {
        let mut full = vec!["--demo"];
        full.extend_from_slice(args);
        self.run(&full)
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn demo_success(&self, args: &[&str]) -> String {
        let mut full = vec!["--demo"];
        full.extend_from_slice(args);
        self.run_success(&full)
    }

    pub fn demo_failure(&self, args: &[&str]) -> String {
        let mut full = vec!["--demo"];
        full.extend_from_slice(args);
        self.run_failure(&full)
    }

    /// Run in demo mode and parse stdout as JSON
    pub fn demo_json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--demo", "--json"];
        full.extend_from_slice(args);
        let stdout = self.run_success(&full);
        serde_json::from_str(&stdout).expect("Output should be valid JSON")
    }
}
