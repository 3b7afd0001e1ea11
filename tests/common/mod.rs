#![allow(dead_code)]

pub mod mock_backend;

pub use mock_backend::{MockBackend, job_json, post_json};

use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the newsdesk binary in an isolated temp directory, with the user
/// config dir pointed inside it and the API env overrides removed.
pub struct NewsdeskTest {
    pub temp_dir: TempDir,
}

impl NewsdeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        NewsdeskTest { temp_dir }
    }

    pub fn command(&self) -> Command {
        let home = self.temp_dir.path().join("home");
        let mut cmd = Command::new(newsdesk_binary());
        cmd.current_dir(self.temp_dir.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env_remove("NEWSDESK_API_URL")
            .env_remove("NEWSDESK_API_TOKEN")
            .env_remove("NEWSDESK_VIEWER_ID")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute newsdesk command")
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
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    /// Create the project-local config directory so `config set` writes there
    pub fn init_local_config(&self) {
        std::fs::create_dir_all(self.temp_dir.path().join(".newsdesk"))
            .expect("Failed to create .newsdesk");
        std::fs::write(self.temp_dir.path().join(".newsdesk/config.yaml"), "{}\n")
            .expect("Failed to write config");
    }

    pub fn read_local_config(&self) -> String {
        std::fs::read_to_string(self.temp_dir.path().join(".newsdesk/config.yaml"))
            .expect("Failed to read config")
    }
}

pub fn newsdesk_binary() -> &'static str {
    env!("CARGO_BIN_EXE_newsdesk")
}
