//! Target platforms for function assets
//!
//! The descriptor set is closed: every supported architecture has exactly one
//! descriptor and unknown keys are rejected instead of defaulting.

use crate::constants::{defaults, platform};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;


/// Compute architecture of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Architecture {
    X86_64,
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 2] = [Architecture::X86_64, Architecture::Arm64];

    /// Key used in configuration files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm_64",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        match key {
            "x86_64" | "X86_64" => Ok(Architecture::X86_64),
            "arm_64" | "ARM_64" => Ok(Architecture::Arm64),
            _ => Err(ConfigError::UnknownArchitecture {
                package: defaults::LABEL.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl TryFrom<String> for Architecture {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_key(&value)
    }
}

impl From<Architecture> for String {
    fn from(value: Architecture) -> Self {
        value.name().to_string()
    }
}

/// How each tool names an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformDescriptor {
    pub architecture: Architecture,
    /// Value reported by `uname -m`
    pub platform_machine: &'static str,
    /// Value expected by `docker --platform`
    pub docker_architecture: &'static str,
    /// Platform for container image assets
    pub ecr_platform: &'static str,
}

const X86_64: PlatformDescriptor = PlatformDescriptor {
    architecture: Architecture::X86_64,
    platform_machine: "x86_64",
    docker_architecture: "amd64",
    ecr_platform: platform::LINUX_AMD64,
};

const ARM_64: PlatformDescriptor = PlatformDescriptor {
    architecture: Architecture::Arm64,
    platform_machine: "aarch64",
    docker_architecture: "arm64",
    ecr_platform: platform::LINUX_ARM64,
};

impl PlatformDescriptor {
    pub fn for_architecture(architecture: Architecture) -> Self {
        match architecture {
            Architecture::X86_64 => X86_64,
            Architecture::Arm64 => ARM_64,
        }
    }

    pub fn lookup(key: &str) -> Result<Self, ConfigError> {
        Architecture::from_key(key).map(Self::for_architecture)
    }

    /// Platform string for `docker run --platform`
    pub fn docker_platform(&self) -> String {
        format!("{}/{}", platform::TARGET_OS, self.docker_architecture)
    }
}

/// Python function runtime, e.g. `python3.11`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Runtime {
    name: String,
}

impl Runtime {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRuntime {
            package: defaults::LABEL.to_string(),
            value: value.to_string(),
        };

        let version = value.strip_prefix("python").ok_or_else(invalid)?;
        let (major, minor) = version.split_once('.').ok_or_else(invalid)?;
        let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if !numeric(major) || !numeric(minor) {
            return Err(invalid());
        }

        Ok(Self {
            name: value.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interpreter version passed to `uv sync --python`
    pub fn python_version(&self) -> &str {
        self.name.trim_start_matches("python")
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            name: defaults::RUNTIME.to_string(),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Runtime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Runtime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Runtime> for String {
    fn from(value: Runtime) -> Self {
        value.name
    }
}
