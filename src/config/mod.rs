use crate::bundler::LocalFailurePolicy;
use crate::constants::defaults;
use crate::platform::{Architecture, Runtime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Runtime, architecture and image used when a function does not bring
    /// its own bundling image
    #[serde(default)]
    pub defaults: DefaultBinding,

    /// Build configuration
    #[serde(default)]
    pub build: BuildConfig,
}

/// The platform-specific default bundling image together with the runtime and
/// architecture it was built for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultBinding {
    #[serde(default)]
    pub runtime: Runtime,

    #[serde(default = "default_architecture")]
    pub architecture: Architecture,

    #[serde(default = "default_bundling_image")]
    pub bundling_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Root for the per-package `uv` project environments
    #[serde(default = "default_tmp_root")]
    pub tmp_root: PathBuf,

    /// What to do when a local build fails
    #[serde(default)]
    pub local_failure_policy: LocalFailurePolicy,

    /// Output directory for staged assets
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_architecture() -> Architecture {
    Architecture::X86_64
}

fn default_bundling_image() -> String {
    defaults::BUNDLING_IMAGE.to_string()
}

fn default_tmp_root() -> PathBuf {
    PathBuf::from(defaults::TMP_ROOT)
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(defaults::OUT_DIR)
}

impl Default for DefaultBinding {
    fn default() -> Self {
        Self {
            runtime: Runtime::default(),
            architecture: default_architecture(),
            bundling_image: default_bundling_image(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tmp_root: default_tmp_root(),
            local_failure_policy: LocalFailurePolicy::default(),
            out_dir: default_out_dir(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("uvlambda").join("config.toml");
            if config_path.exists() {
                return Self::from_path(&config_path);
            }
        }
        Ok(Config::default())
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
