use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::{container, defaults};
use crate::error::ConfigError;
use crate::function::FunctionProps;
use crate::platform::{Architecture, Runtime};
use crate::verify::Target;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "uvlambda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by commands that bundle a single package
#[derive(clap::Args, Debug, Clone)]
pub struct PackageArgs {
    /// Name of the uv workspace package to bundle
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// Path to the uv workspace root
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Lambda handler, defaults to <package>.lambda_function.lambda_handler
    #[arg(long)]
    pub handler: Option<String>,

    /// Python runtime (e.g., python3.11)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Target architecture (x86_64 or arm_64)
    #[arg(long)]
    pub architecture: Option<String>,

    /// Custom bundling image, should be pinned by digest
    #[arg(long)]
    pub bundling_image: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the local recipe and the docker fallback for a package
    Plan {
        #[command(flatten)]
        package: PackageArgs,

        /// Output directory the recipe copies into
        #[arg(long, default_value = container::ASSET_OUTPUT)]
        output: PathBuf,
    },

    /// Bundle a package, locally when possible and in docker otherwise
    Bundle {
        #[command(flatten)]
        package: PackageArgs,

        /// Directory for staged assets
        #[arg(long, env = "UVLAMBDA_OUT")]
        out: Option<PathBuf>,
    },

    /// Bundle every stack of an app and write its manifest
    Synth {
        /// App definition file
        #[arg(short = 'f', long = "filename", default_value = defaults::APP_FILE)]
        filename: PathBuf,

        /// Directory for staged assets and manifest.json
        #[arg(long, env = "UVLAMBDA_OUT")]
        out: Option<PathBuf>,
    },

    /// Check that a deployed function answers as expected
    #[command(group(clap::ArgGroup::new("target").required(true).args(["url", "function", "stack"])))]
    Verify {
        /// Function URL to call
        #[arg(long)]
        url: Option<String>,

        /// Function name or ARN to invoke directly
        #[arg(long)]
        function: Option<String>,

        /// Deployed stack whose LambdaFunctionArn output is invoked
        #[arg(long)]
        stack: Option<String>,

        /// With --stack, call the LambdaFunctionUrl output instead
        #[arg(long, requires = "stack")]
        via_url: bool,

        /// Sign function URL requests with SigV4, for URLs using IAM auth
        #[arg(long)]
        sign: bool,

        /// AWS region for stack lookup, invocation and signing
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,

        /// Expected body: 1 or 2 for the demo functions, or a literal string
        #[arg(long)]
        expect: String,
    },

    /// Show version information
    Version,
}

impl PackageArgs {
    /// Function options from the flags, with parse errors tagged with the
    /// package name
    pub fn props(&self) -> Result<FunctionProps, ConfigError> {
        let package = &self.package;
        let runtime = self
            .runtime
            .as_deref()
            .map(Runtime::parse)
            .transpose()
            .map_err(|e| e.for_package(package))?;
        let architecture = self
            .architecture
            .as_deref()
            .map(Architecture::from_key)
            .transpose()
            .map_err(|e| e.for_package(package))?;

        Ok(FunctionProps {
            package_name: package.clone(),
            path: self.path.clone(),
            handler: self.handler.clone(),
            runtime,
            architecture,
            bundling_image: self.bundling_image.clone(),
        })
    }
}

/// Target of the `verify` command, once clap has checked that exactly one
/// was given
pub fn verify_target(
    url: Option<String>,
    function: Option<String>,
    stack: Option<String>,
    via_url: bool,
) -> Option<Target> {
    match (url, function, stack) {
        (Some(url), None, None) => Some(Target::Url(url)),
        (None, Some(function), None) => Some(Target::Function(function)),
        (None, None, Some(name)) => Some(Target::Stack { name, via_url }),
        _ => None,
    }
}
