use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use tracing::{debug, error};

/// Captured output of a successful process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools (`uv`, `bash`, `docker`)
///
/// `env` is applied on top of the inherited environment and `cwd` defaults
/// to the current directory. A non-zero exit status is an error carrying the
/// process's stderr.
pub trait ProcessRunner: Send + Sync {
    fn run(
        &self,
        args: &[String],
        env: &BTreeMap<String, String>,
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput>;
}

pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        args: &[String],
        env: &BTreeMap<String, String>,
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput> {
        let (program, rest) = args.split_first().context("Cannot run an empty command")?;
        let program_path =
            which::which(program).with_context(|| format!("Executable not found: {}", program))?;

        let mut cmd = Command::new(program_path);
        cmd.args(rest).envs(env);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        debug!("Running command: {:?}", args);
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            error!("{} failed with {}", program, output.status);
            debug!("stdout:\n{}", stdout);
            anyhow::bail!("{} failed ({}): {}", program, output.status, stderr.trim());
        }

        Ok(ProcessOutput { stdout, stderr })
    }
}
