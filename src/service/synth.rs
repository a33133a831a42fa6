//! Synthesis of a whole app
//!
//! Every stack is validated before anything is built, so an invalid
//! definition never leaves half-staged assets behind.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{
    app::{AppDefinition, FunctionKind, FunctionManifest, Manifest, StackDefinition, StackManifest},
    asset::{package_zip, AssetStager},
    constants::env::REPRODUCIBLE_EPOCH,
    function::{BuildContext, DockerImageFunction, PythonFunction},
};

enum Planned<'a> {
    Zip(&'a StackDefinition, PythonFunction),
    Image(&'a StackDefinition, DockerImageFunction),
}

pub struct SynthService;

impl SynthService {
    /// Stage every stack's asset under `out_dir` and write `manifest.json`
    pub fn synth(app: &AppDefinition, ctx: &BuildContext, out_dir: &Path) -> Result<Manifest> {
        let planned = Self::plan(app, ctx)?;
        let stager = AssetStager::new(out_dir, ctx.runner.clone());
        let mut stacks = Vec::new();

        for item in &planned {
            let manifest = match item {
                Planned::Zip(stack, function) => {
                    info!("Synthesizing stack: {}", stack.name);
                    let asset = stager.stage(&function.code)?;
                    let zip_path = PathBuf::from(format!("{}.zip", asset.path.display()));
                    package_zip(&asset.path, &zip_path, REPRODUCIBLE_EPOCH)?;

                    StackManifest::new(
                        stack,
                        FunctionManifest::Zip {
                            handler: function.handler.clone(),
                            runtime: function.runtime.to_string(),
                            architecture: function.architecture.to_string(),
                            asset,
                            zip_path,
                        },
                    )
                }
                Planned::Image(stack, function) => {
                    info!("Synthesizing stack: {}", stack.name);
                    let asset = stager.stage(&function.code)?;
                    let image = stager.prepare_image(&asset, function)?;

                    StackManifest::new(
                        stack,
                        FunctionManifest::Image {
                            architecture: function.platform.architecture.to_string(),
                            asset,
                            image,
                        },
                    )
                }
            };
            stacks.push(manifest);
        }

        let manifest = Manifest { version: 1, stacks };
        let manifest_path = stager.out_dir().join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

        info!(
            "Synthesized {} stack(s) to {}",
            manifest.stacks.len(),
            manifest_path.display()
        );
        Ok(manifest)
    }

    fn plan<'a>(app: &'a AppDefinition, ctx: &BuildContext) -> Result<Vec<Planned<'a>>> {
        let mut planned = Vec::new();
        for stack in &app.stacks {
            let props = stack.props(&app.source)?;
            let item = match stack.kind {
                FunctionKind::Zip => {
                    Planned::Zip(stack, PythonFunction::new(&stack.function_id, props, ctx)?)
                }
                FunctionKind::Image => {
                    let dockerfile = stack.dockerfile.clone().with_context(|| {
                        format!("[{}] Missing dockerfile", stack.package_name)
                    })?;
                    Planned::Image(
                        stack,
                        DockerImageFunction::new(&stack.function_id, props, dockerfile, ctx)?,
                    )
                }
            };
            planned.push(item);
        }
        Ok(planned)
    }
}
