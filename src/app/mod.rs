//! Deployment definitions
//!
//! An app file lists one stack per function. Paths in the file are relative
//! to the file itself.

use crate::asset::{ImageAsset, StagedAsset};
use crate::constants::verify;
use crate::error::ConfigError;
use crate::function::FunctionProps;
use crate::platform::{Architecture, Runtime};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Deserialize)]
pub struct AppDefinition {
    /// Root of the uv workspace holding every package
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default)]
    pub stacks: Vec<StackDefinition>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// Bundle zipped and deployed as function code
    #[default]
    Zip,
    /// Bundle copied into a container image build context
    Image,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackDefinition {
    pub name: String,
    pub function_id: String,
    pub package_name: String,
    pub handler: Option<String>,
    pub runtime: Option<String>,
    pub architecture: Option<String>,
    pub bundling_image: Option<String>,
    #[serde(default)]
    pub kind: FunctionKind,
    pub dockerfile: Option<PathBuf>,
}

fn default_source() -> PathBuf {
    PathBuf::from(".")
}

impl AppDefinition {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut app: AppDefinition = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        app.source = base.join(&app.source);
        for stack in &mut app.stacks {
            if let Some(dockerfile) = &stack.dockerfile {
                stack.dockerfile = Some(base.join(dockerfile));
            }
        }

        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for stack in &self.stacks {
            if !names.insert(stack.name.as_str()) {
                anyhow::bail!("Duplicate stack name: {}", stack.name);
            }
            if stack.kind == FunctionKind::Image && stack.dockerfile.is_none() {
                anyhow::bail!(
                    "[{}] Stack {} builds an image but has no dockerfile",
                    stack.package_name,
                    stack.name
                );
            }
        }
        Ok(())
    }
}

impl StackDefinition {
    /// Function options for this stack, with runtime and architecture parsed
    pub fn props(&self, source: &Path) -> Result<FunctionProps, ConfigError> {
        let package = &self.package_name;
        let mut props = FunctionProps::new(package, source);
        props.handler = self.handler.clone();
        props.bundling_image = self.bundling_image.clone();
        props.runtime = self
            .runtime
            .as_deref()
            .map(Runtime::parse)
            .transpose()
            .map_err(|e| e.for_package(package))?;
        props.architecture = self
            .architecture
            .as_deref()
            .map(Architecture::from_key)
            .transpose()
            .map_err(|e| e.for_package(package))?;
        Ok(props)
    }
}

/// Synthesized description of every stack, consumed by the provisioning
/// engine
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub version: u32,
    pub stacks: Vec<StackManifest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackManifest {
    pub name: String,
    pub function_id: String,
    pub package_name: String,
    pub function: FunctionManifest,
    pub outputs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FunctionManifest {
    Zip {
        handler: String,
        runtime: String,
        architecture: String,
        asset: StagedAsset,
        zip_path: PathBuf,
    },
    Image {
        architecture: String,
        asset: StagedAsset,
        image: ImageAsset,
    },
}

impl StackManifest {
    pub fn new(stack: &StackDefinition, function: FunctionManifest) -> Self {
        let outputs = BTreeMap::from([
            (
                verify::FUNCTION_ARN_OUTPUT.to_string(),
                format!("${{{}.Arn}}", stack.function_id),
            ),
            (
                verify::FUNCTION_URL_OUTPUT.to_string(),
                format!("${{{}.FunctionUrl}}", stack.function_id),
            ),
        ]);

        Self {
            name: stack.name.clone(),
            function_id: stack.function_id.clone(),
            package_name: stack.package_name.clone(),
            function,
            outputs,
        }
    }
}
