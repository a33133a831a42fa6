//! Python function definitions
//!
//! Validates the requested runtime and architecture against the bundling
//! image and wires the bundling strategy into a code asset.

use crate::bundler::{
    discover_cache_dir, recipe::validate_package_name, BundlingOptions, DockerBundling,
    HostProbe, LocalFailurePolicy, ProcessRunner, SystemHost, SystemRunner, UvLocalBundling,
};
use crate::config::{Config, DefaultBinding};
use crate::constants::defaults;
use crate::error::ConfigError;
use crate::platform::{Architecture, PlatformDescriptor, Runtime};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;


/// Options for a Python function. Unset runtime and architecture fall back
/// to the default binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionProps {
    pub package_name: String,
    /// Root of the uv workspace the package lives in
    pub path: PathBuf,
    pub handler: Option<String>,
    pub runtime: Option<Runtime>,
    pub architecture: Option<Architecture>,
    pub bundling_image: Option<String>,
}

impl FunctionProps {
    pub fn new(package_name: &str, path: impl AsRef<Path>) -> Self {
        Self {
            package_name: package_name.to_string(),
            path: path.as_ref().to_path_buf(),
            handler: None,
            runtime: None,
            architecture: None,
            bundling_image: None,
        }
    }

    pub fn with_handler(mut self, handler: &str) -> Self {
        self.handler = Some(handler.to_string());
        self
    }

    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    pub fn with_bundling_image(mut self, image: &str) -> Self {
        self.bundling_image = Some(image.to_string());
        self
    }

    /// `demo-lambda1` → `demo_lambda1.lambda_function.lambda_handler`
    pub fn handler_or_default(&self) -> String {
        self.handler.clone().unwrap_or_else(|| {
            format!(
                "{}.lambda_function.lambda_handler",
                self.package_name.replace('-', "_")
            )
        })
    }
}

/// Runtime, platform and image a function is bundled for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub runtime: Runtime,
    pub platform: PlatformDescriptor,
    pub bundling_image: String,
}

impl ResolvedTarget {
    pub fn python_version(&self) -> &str {
        self.runtime.python_version()
    }
}

/// Check the function's options against the bundling image.
///
/// The default image is built for one runtime and one architecture, so any
/// explicit value must match it. A custom image is trusted as given.
pub fn resolve_target(
    props: &FunctionProps,
    defaults: &DefaultBinding,
) -> Result<ResolvedTarget, ConfigError> {
    validate_package_name(&props.package_name)?;
    let package = &props.package_name;

    match &props.bundling_image {
        None => {
            if let Some(runtime) = &props.runtime {
                if runtime != &defaults.runtime {
                    return Err(ConfigError::DefaultImageMismatch {
                        package: package.clone(),
                        argument: "runtime",
                        expected: defaults.runtime.to_string(),
                        actual: runtime.to_string(),
                    });
                }
            }
            if let Some(architecture) = props.architecture {
                if architecture != defaults.architecture {
                    return Err(ConfigError::DefaultImageMismatch {
                        package: package.clone(),
                        argument: "architecture",
                        expected: defaults.architecture.to_string(),
                        actual: architecture.to_string(),
                    });
                }
            }

            Ok(ResolvedTarget {
                runtime: defaults.runtime.clone(),
                platform: PlatformDescriptor::for_architecture(defaults.architecture),
                bundling_image: defaults.bundling_image.clone(),
            })
        }
        Some(image) => {
            if !image.contains('@') {
                warn!(
                    "[{}] Docker image was not provided with hash, incorrect platform may be used...",
                    package
                );
            }

            Ok(ResolvedTarget {
                runtime: props.runtime.clone().unwrap_or_else(|| defaults.runtime.clone()),
                platform: PlatformDescriptor::for_architecture(
                    props.architecture.unwrap_or(defaults.architecture),
                ),
                bundling_image: image.clone(),
            })
        }
    }
}

/// Host, process runner and build settings shared by every function in a
/// deployment
#[derive(Clone)]
pub struct BuildContext {
    pub defaults: DefaultBinding,
    pub tmp_root: PathBuf,
    pub policy: LocalFailurePolicy,
    pub host: Arc<dyn HostProbe>,
    pub runner: Arc<dyn ProcessRunner>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            defaults: DefaultBinding::default(),
            tmp_root: PathBuf::from(defaults::TMP_ROOT),
            policy: LocalFailurePolicy::default(),
            host: Arc::new(SystemHost),
            runner: Arc::new(SystemRunner),
        }
    }
}

impl BuildContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            defaults: config.defaults.clone(),
            tmp_root: config.build.tmp_root.clone(),
            policy: config.build.local_failure_policy,
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: Arc<dyn HostProbe>) -> Self {
        self.host = host;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }
}

/// Source directory plus the bundling that turns it into a deployable asset.
/// The asset hash is computed over the bundled output, not the source.
pub struct AssetCode {
    pub path: PathBuf,
    pub bundling: BundlingOptions,
}

pub fn python_function_code(
    props: &FunctionProps,
    target: &ResolvedTarget,
    ctx: &BuildContext,
) -> Result<AssetCode, ConfigError> {
    let package = &props.package_name;
    let cache_dir = discover_cache_dir(package, ctx.runner.as_ref());

    let docker = DockerBundling::new(
        package,
        &target.platform,
        target.python_version(),
        &target.bundling_image,
        cache_dir,
    )?;

    let local = UvLocalBundling::new(package, target.platform, target.python_version())
        .with_source_dir(&props.path)
        .with_tmp_root(&ctx.tmp_root)
        .with_policy(ctx.policy)
        .with_host(ctx.host.clone())
        .with_runner(ctx.runner.clone());

    Ok(AssetCode {
        path: props.path.clone(),
        bundling: BundlingOptions {
            docker,
            local: Box::new(local),
        },
    })
}

/// A zip-packaged Python function
pub struct PythonFunction {
    pub construct_id: String,
    pub package_name: String,
    pub handler: String,
    pub runtime: Runtime,
    pub architecture: Architecture,
    pub code: AssetCode,
}

impl PythonFunction {
    pub fn new(
        construct_id: &str,
        props: FunctionProps,
        ctx: &BuildContext,
    ) -> Result<Self, ConfigError> {
        let target = resolve_target(&props, &ctx.defaults)?;
        let code = python_function_code(&props, &target, ctx)?;

        Ok(Self {
            construct_id: construct_id.to_string(),
            package_name: props.package_name.clone(),
            handler: props.handler_or_default(),
            runtime: target.runtime,
            architecture: target.platform.architecture,
            code,
        })
    }
}

/// A Python function shipped as a container image built on top of the
/// bundled dependencies
pub struct DockerImageFunction {
    pub construct_id: String,
    pub package_name: String,
    pub dockerfile: PathBuf,
    pub cmd: Vec<String>,
    pub build_args: BTreeMap<String, String>,
    pub platform: PlatformDescriptor,
    pub code: AssetCode,
}

impl DockerImageFunction {
    pub fn new(
        construct_id: &str,
        props: FunctionProps,
        dockerfile: impl AsRef<Path>,
        ctx: &BuildContext,
    ) -> Result<Self, ConfigError> {
        let target = resolve_target(&props, &ctx.defaults)?;
        let code = python_function_code(&props, &target, ctx)?;

        Ok(Self {
            construct_id: construct_id.to_string(),
            package_name: props.package_name.clone(),
            dockerfile: dockerfile.as_ref().to_path_buf(),
            cmd: vec![props.handler_or_default()],
            build_args: BTreeMap::from([(
                "PYTHON_VERSION".to_string(),
                target.python_version().to_string(),
            )]),
            platform: target.platform,
            code,
        })
    }
}
