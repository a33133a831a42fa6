//! Configuration errors
//!
//! These indicate that a function definition itself is invalid. They are
//! raised before any build is attempted and are never downgraded to a
//! fallback.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("[{package}] Unknown architecture '{key}', expected one of: x86_64, arm_64")]
    UnknownArchitecture { package: String, key: String },

    #[error("[{package}] Invalid runtime '{value}', expected a value like python3.11")]
    InvalidRuntime { package: String, value: String },

    #[error("[{package}] Only {argument}={expected} is supported with the default bundling image, got {actual}")]
    DefaultImageMismatch {
        package: String,
        argument: &'static str,
        expected: String,
        actual: String,
    },

    #[error("[{package}] Invalid package name, expected a non-empty name of letters, digits, '.', '_' or '-'")]
    InvalidPackageName { package: String },
}

impl ConfigError {
    /// Attach a package name to an error raised before it was known
    pub fn for_package(self, name: &str) -> Self {
        match self {
            Self::UnknownArchitecture { key, .. } => Self::UnknownArchitecture {
                package: name.to_string(),
                key,
            },
            Self::InvalidRuntime { value, .. } => Self::InvalidRuntime {
                package: name.to_string(),
                value,
            },
            Self::DefaultImageMismatch {
                argument,
                expected,
                actual,
                ..
            } => Self::DefaultImageMismatch {
                package: name.to_string(),
                argument,
                expected,
                actual,
            },
            Self::InvalidPackageName { .. } => Self::InvalidPackageName {
                package: name.to_string(),
            },
        }
    }
}
