//! Containerized bundling
//!
//! This is the last resort, so failures here abort the deployment.

use super::process::ProcessRunner;
use super::recipe::build_asset_command_and_env;
use crate::constants::{container, defaults, env};
use crate::error::ConfigError;
use crate::platform::PlatformDescriptor;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockerVolume {
    pub host_path: PathBuf,
    pub container_path: String,
}

/// Everything `docker run` needs to bundle a package inside the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DockerBundling {
    pub package_name: String,
    pub image: String,
    pub command: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub volumes: Vec<DockerVolume>,
    pub platform: String,
}

impl DockerBundling {
    pub fn new(
        package_name: &str,
        platform: &PlatformDescriptor,
        python_version: &str,
        image: &str,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        // Paths are inside the container, so the host's tmp root does not apply
        let recipe = build_asset_command_and_env(
            package_name,
            container::ASSET_OUTPUT,
            platform,
            python_version,
            Path::new(defaults::TMP_ROOT),
        )?;

        let mut environment = recipe.env;
        environment.insert(
            env::UV_CACHE_DIR.to_string(),
            container::UV_CACHE_DIR_ENV.to_string(),
        );

        let volumes = cache_dir
            .map(|host_path| DockerVolume {
                host_path,
                container_path: container::UV_CACHE.to_string(),
            })
            .into_iter()
            .collect();

        Ok(Self {
            package_name: package_name.to_string(),
            image: image.to_string(),
            command: recipe.command,
            environment,
            volumes,
            platform: platform.docker_architecture.to_string(),
        })
    }

    /// Arguments for `docker run` with `input_dir` as the build context and
    /// `output_dir` receiving the bundle
    pub fn docker_args(&self, input_dir: &Path, output_dir: &Path, user: Option<&str>) -> Vec<String> {
        let mut args = vec![
            "docker".to_string(),
            "run".to_string(),
            "--rm".to_string(),
            "--platform".to_string(),
            format!("linux/{}", self.platform),
        ];

        if let Some(user) = user {
            args.push("-u".to_string());
            args.push(user.to_string());
        }

        args.push("-v".to_string());
        args.push(format!("{}:{}:delegated", input_dir.display(), container::ASSET_INPUT));
        args.push("-v".to_string());
        args.push(format!("{}:{}:delegated", output_dir.display(), container::ASSET_OUTPUT));

        for volume in &self.volumes {
            args.push("-v".to_string());
            args.push(format!(
                "{}:{}:delegated",
                volume.host_path.display(),
                volume.container_path
            ));
        }

        for (key, value) in &self.environment {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }

        args.push("-w".to_string());
        args.push(container::ASSET_INPUT.to_string());
        args.push(self.image.clone());
        args.extend(self.command.iter().cloned());
        args
    }

    pub fn run(&self, runner: &dyn ProcessRunner, input_dir: &Path, output_dir: &Path) -> Result<()> {
        let user = owner_of(output_dir);
        let args = self.docker_args(input_dir, output_dir, user.as_deref());

        info!("[{}] Bundling in container {}", self.package_name, self.image);
        runner
            .run(&args, &BTreeMap::new(), None)
            .with_context(|| format!("[{}] Docker bundling failed", self.package_name))?;
        Ok(())
    }
}

/// Run the container as the owner of the output directory so the bundle
/// stays writable by the deploying user
#[cfg(unix)]
fn owner_of(path: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path)
        .ok()
        .map(|m| format!("{}:{}", m.uid(), m.gid()))
}

#[cfg(not(unix))]
fn owner_of(_path: &Path) -> Option<String> {
    None
}
