#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct ReconRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl ReconRun {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.stdout.trim())
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }

    /// The structured error printed on stderr, skipping any log lines.
    pub fn stderr_json(&self) -> serde_json::Value {
        let start = self.stderr.find("{\n").unwrap_or(0);
        serde_json::from_str(self.stderr[start..].trim())
            .unwrap_or_else(|e| panic!("stderr is not JSON ({e}): {}", self.stderr))
    }
}

/// A temporary directory acting as both the project root and `HOME`.
pub struct ReconWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl ReconWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// A workspace with `recon init` already run.
    pub fn initialized() -> Self {
        let workspace = Self::new();
        let run = run_recon(&workspace, ["init"]);
        assert!(run.status.success(), "init failed: {}", run.stderr);
        workspace
    }

    pub fn recon_command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("recon"));
        cmd.current_dir(&self.root);
        cmd.env("NO_COLOR", "1");
        cmd.env("HOME", &self.root);
        cmd.env("USER", "tester");
        for var in [
            "RUST_LOG",
            "RECON_DIR",
            "RECON_ACTOR",
            "RECON_DB",
            "RECON_LOG_FILE",
            "RECON_LOG_FORMAT",
            "RECON_DUE_SOON_DAYS",
            "RECON_DEFAULT_SEVERITY",
            "RECON_DEFAULT_PRIORITY",
            "RECON_LOCK_TIMEOUT",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }
}

pub fn run_recon<I, S>(workspace: &ReconWorkspace, args: I) -> ReconRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_recon_with_env(workspace, args, std::iter::empty::<(String, String)>())
}

pub fn run_recon_with_env<I, S, E, K, V>(workspace: &ReconWorkspace, args: I, env_vars: E) -> ReconRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = workspace.recon_command();
    cmd.args(args);
    cmd.envs(env_vars);
    let output = cmd.output().expect("run recon");

    ReconRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
