use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};

use usupack_installer::InstallLayout;

// The interactive terminal emulator lives outside this crate; anything that
// can start a process from a SpawnRequest qualifies as a session host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub executable: PathBuf,
    pub working_dir: PathBuf,
    pub environment: Vec<(String, String)>,
    pub args: Vec<String>,
}

pub trait TerminalSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<i32>;
}

pub struct ProcessSpawner;

impl TerminalSpawner for ProcessSpawner {
    fn spawn(&self, request: &SpawnRequest) -> Result<i32> {
        let mut command = Command::new(&request.executable);
        command
            .args(&request.args)
            .current_dir(&request.working_dir)
            .env_clear();
        for (key, value) in &request.environment {
            command.env(key, value);
        }
        let status = command
            .status()
            .with_context(|| format!("failed to spawn {}", request.executable.display()))?;
        Ok(status.code().unwrap_or(-1))
    }
}

// The layout guarantees the session contract: the helper by absolute path,
// lib/ on the library search path, home and cwd inside the app root.
pub fn build_shell_request(layout: &InstallLayout) -> SpawnRequest {
    SpawnRequest {
        executable: layout.primary_binary_path(),
        working_dir: layout.app_root().to_path_buf(),
        environment: vec![
            ("TERM".to_string(), "xterm-256color".to_string()),
            ("HOME".to_string(), layout.app_root().display().to_string()),
            (
                "PATH".to_string(),
                format!("{}:/usr/bin:/bin", layout.bin_dir().display()),
            ),
            (
                "LD_LIBRARY_PATH".to_string(),
                layout.lib_dir().display().to_string(),
            ),
        ],
        args: Vec::new(),
    }
}
