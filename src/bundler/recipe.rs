//! Build recipe for a package's runtime dependencies

use crate::constants::env;
use crate::error::ConfigError;
use crate::platform::PlatformDescriptor;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A command and the environment it must run with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleRecipe {
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// The `uv` project environment for a package. It is the same on every run so
/// that paths embedded in the output stay stable.
pub fn project_environment(tmp_root: &Path, package_name: &str) -> PathBuf {
    tmp_root.join(format!("uv-{}-build", package_name))
}

pub fn validate_package_name(package_name: &str) -> Result<(), ConfigError> {
    let valid = !package_name.is_empty()
        && package_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPackageName {
            package: package_name.to_string(),
        })
    }
}

/// Build the command that installs `package_name`'s dependencies into
/// `output_path`, together with its environment.
pub fn build_asset_command_and_env(
    package_name: &str,
    output_path: &str,
    platform: &PlatformDescriptor,
    python_version: &str,
    tmp_root: &Path,
) -> Result<BundleRecipe, ConfigError> {
    validate_package_name(package_name)?;

    let tmp_path = project_environment(tmp_root, package_name);
    let site_packages = tmp_path
        .join("lib")
        .join(format!("python{}", python_version))
        .join("site-packages");
    let dest = format!("{}/", output_path.trim_end_matches('/'));

    let steps = [
        // Fail early when the build runs on the wrong architecture
        format!("[ \"$(uname -m)\" = {} ]", platform.platform_machine),
        format!(
            "uv sync --package {} --frozen --no-dev --no-editable --compile-bytecode --python {}",
            shell_quote(package_name),
            python_version
        ),
        format!(
            "cp -r {}/. {}",
            shell_quote(&site_packages.to_string_lossy()),
            shell_quote(&dest)
        ),
    ];

    let command = vec![
        "bash".to_string(),
        "-c".to_string(),
        steps.join(" && "),
    ];

    let env = BTreeMap::from([
        (
            env::UV_PROJECT_ENVIRONMENT.to_string(),
            tmp_path.to_string_lossy().to_string(),
        ),
        // Installer metadata includes timestamps
        (env::UV_NO_INSTALLER_METADATA.to_string(), "1".to_string()),
        (env::UV_LINK_MODE.to_string(), "copy".to_string()),
        (
            env::SOURCE_DATE_EPOCH.to_string(),
            env::REPRODUCIBLE_EPOCH.to_string(),
        ),
    ]);

    Ok(BundleRecipe { command, env })
}

/// Quote a word for `bash -c` unless it only holds safe characters
pub(crate) fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | ':' | '@' | '=' | '+' | ','));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r#"'"'"'"#))
    }
}
