//! Local bundling on the deploying host
//!
//! A local build is only attempted when the host matches the target exactly.
//! Anything else falls back to the containerized build.

use super::process::{ProcessRunner, SystemRunner};
use super::recipe::build_asset_command_and_env;
use crate::constants::{defaults, platform::TARGET_OS};
use crate::platform::PlatformDescriptor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Hook the asset stager calls before falling back to the container.
/// `Ok(false)` means the caller must use the containerized build.
pub trait LocalBundling: Send + Sync {
    fn try_bundle(&self, output_dir: &Path) -> Result<bool>;
}

/// What a failing local build does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalFailurePolicy {
    /// Log the failure and let the container build run
    #[default]
    Fallback,
    /// Abort the deployment
    Propagate,
}

/// Facts about the deploying host
pub trait HostProbe: Send + Sync {
    fn os(&self) -> String;
    fn machine(&self) -> String;
    fn is_symlink(&self, path: &Path) -> bool;
}

pub struct SystemHost;

impl HostProbe for SystemHost {
    fn os(&self) -> String {
        std::env::consts::OS.to_string()
    }

    /// `uname -m`, as the recipe's guard sees it
    fn machine(&self) -> String {
        let args = ["uname", "-m"].map(String::from);
        match SystemRunner.run(&args, &BTreeMap::new(), None) {
            Ok(output) if !output.stdout.trim().is_empty() => output.stdout.trim().to_string(),
            _ => std::env::consts::ARCH.to_string(),
        }
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(String),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

pub fn check_local_eligibility(
    host: &dyn HostProbe,
    platform: &PlatformDescriptor,
    tmp_root: &Path,
) -> Eligibility {
    if host.os() != TARGET_OS || host.machine() != platform.platform_machine {
        return Eligibility::Ineligible(format!(
            "Local bundling is only supported on {} Linux, using Docker bundling instead...",
            platform.platform_machine
        ));
    }

    // A symlinked temp root would move the project environment and change
    // the paths embedded in the output
    if host.is_symlink(tmp_root) {
        return Eligibility::Ineligible(format!(
            "Local bundling is not supported when {} is a symlink, using Docker bundling instead...",
            tmp_root.display()
        ));
    }

    Eligibility::Eligible
}

pub struct UvLocalBundling {
    package_name: String,
    platform: PlatformDescriptor,
    python_version: String,
    source_dir: PathBuf,
    tmp_root: PathBuf,
    policy: LocalFailurePolicy,
    host: Arc<dyn HostProbe>,
    runner: Arc<dyn ProcessRunner>,
}

impl UvLocalBundling {
    pub fn new(package_name: &str, platform: PlatformDescriptor, python_version: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            platform,
            python_version: python_version.to_string(),
            source_dir: PathBuf::from("."),
            tmp_root: PathBuf::from(defaults::TMP_ROOT),
            policy: LocalFailurePolicy::default(),
            host: Arc::new(SystemHost),
            runner: Arc::new(SystemRunner),
        }
    }

    /// Directory `uv sync` runs in, inside the uv workspace
    pub fn with_source_dir(mut self, source_dir: impl AsRef<Path>) -> Self {
        self.source_dir = source_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_tmp_root(mut self, tmp_root: impl AsRef<Path>) -> Self {
        self.tmp_root = tmp_root.as_ref().to_path_buf();
        self
    }

    pub fn with_policy(mut self, policy: LocalFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_host(mut self, host: Arc<dyn HostProbe>) -> Self {
        self.host = host;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn eligibility(&self) -> Eligibility {
        check_local_eligibility(self.host.as_ref(), &self.platform, &self.tmp_root)
    }

    fn bundle(&self, output_dir: &Path) -> Result<()> {
        let recipe = build_asset_command_and_env(
            &self.package_name,
            &output_dir.to_string_lossy(),
            &self.platform,
            &self.python_version,
            &self.tmp_root,
        )?;

        info!("[{}] Bundling locally into {}", self.package_name, output_dir.display());
        self.runner
            .run(&recipe.command, &recipe.env, Some(&self.source_dir))
            .with_context(|| format!("[{}] Local bundling failed", self.package_name))?;
        Ok(())
    }
}

impl LocalBundling for UvLocalBundling {
    fn try_bundle(&self, output_dir: &Path) -> Result<bool> {
        if let Eligibility::Ineligible(reason) = self.eligibility() {
            info!("[{}] {}", self.package_name, reason);
            return Ok(false);
        }

        match self.bundle(output_dir) {
            Ok(()) => Ok(true),
            Err(e) => match self.policy {
                LocalFailurePolicy::Fallback => {
                    warn!("{:#}", e);
                    Ok(false)
                }
                LocalFailurePolicy::Propagate => Err(e),
            },
        }
    }
}
