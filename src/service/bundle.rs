//! Single-package bundling
//!
//! Backs the `plan` and `bundle` commands.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::{
    asset::{AssetStager, StagedAsset},
    bundler::{build_asset_command_and_env, check_local_eligibility, BundleRecipe, DockerBundling},
    function::{python_function_code, resolve_target, BuildContext, FunctionProps},
};

/// Everything that would run for a package, without running it
#[derive(Debug, Clone, Serialize)]
pub struct BundlePlan {
    pub package_name: String,
    pub handler: String,
    pub runtime: String,
    pub architecture: String,
    pub local_eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ineligible_reason: Option<String>,
    pub local: BundleRecipe,
    pub docker: DockerBundling,
}

pub struct BundleService;

impl BundleService {
    pub fn plan(props: &FunctionProps, ctx: &BuildContext, output_dir: &Path) -> Result<BundlePlan> {
        let target = resolve_target(props, &ctx.defaults)?;
        let code = python_function_code(props, &target, ctx)?;

        let local = build_asset_command_and_env(
            &props.package_name,
            &output_dir.to_string_lossy(),
            &target.platform,
            target.python_version(),
            &ctx.tmp_root,
        )?;
        let eligibility = check_local_eligibility(ctx.host.as_ref(), &target.platform, &ctx.tmp_root);

        Ok(BundlePlan {
            package_name: props.package_name.clone(),
            handler: props.handler_or_default(),
            runtime: target.runtime.to_string(),
            architecture: target.platform.architecture.to_string(),
            local_eligible: eligibility.is_eligible(),
            local_ineligible_reason: match eligibility {
                crate::bundler::Eligibility::Ineligible(reason) => Some(reason),
                crate::bundler::Eligibility::Eligible => None,
            },
            local,
            docker: code.bundling.docker,
        })
    }

    /// Bundle one package into `out_dir`, locally if the host allows it
    pub fn bundle(props: &FunctionProps, ctx: &BuildContext, out_dir: &Path) -> Result<StagedAsset> {
        let target = resolve_target(props, &ctx.defaults)?;
        let code = python_function_code(props, &target, ctx)?;

        let staged = AssetStager::new(out_dir, ctx.runner.clone()).stage(&code)?;
        info!(
            "[{}] Bundled {} ({})",
            props.package_name,
            staged.hash,
            if staged.bundled_locally { "local" } else { "docker" }
        );
        Ok(staged)
    }
}
