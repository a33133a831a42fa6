//! Asset staging
//!
//! Runs the bundling for a code asset, names the result after a hash of the
//! bundled output and packages it for deployment.

use crate::bundler::ProcessRunner;
use crate::function::{AssetCode, DockerImageFunction};
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};


/// A bundled asset in the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedAsset {
    pub package_name: String,
    pub hash: String,
    pub path: PathBuf,
    pub bundled_locally: bool,
}

/// Build context for a container image function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub asset_name: String,
    pub directory: PathBuf,
    pub build_args: BTreeMap<String, String>,
    pub platform: String,
    pub cmd: Vec<String>,
}

pub struct AssetStager {
    out_dir: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl AssetStager {
    pub fn new(out_dir: impl AsRef<Path>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            runner,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Bundle `code` locally if possible, otherwise in the container, and
    /// move the result to `asset.<hash>`
    pub fn stage(&self, code: &AssetCode) -> Result<StagedAsset> {
        let package = &code.bundling.docker.package_name;

        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
        let scratch = tempfile::Builder::new()
            .prefix("bundling-temp-")
            .tempdir_in(&self.out_dir)
            .context("Failed to create bundling directory")?;
        let output_dir = fs::canonicalize(scratch.path())?;

        let bundled_locally = code.bundling.local.try_bundle(&output_dir)?;
        if !bundled_locally {
            // A failed local build may have copied part of its output
            reset_dir(&output_dir)?;
            let input_dir = fs::canonicalize(&code.path)
                .with_context(|| format!("[{}] Asset path {} not found", package, code.path.display()))?;
            code.bundling
                .docker
                .run(self.runner.as_ref(), &input_dir, &output_dir)?;
        }

        let hash = hash_directory(&output_dir)?;
        let path = self.out_dir.join(format!("asset.{}", hash));

        if path.exists() {
            debug!("[{}] Asset {} already staged", package, hash);
        } else {
            // The scratch guard's own cleanup is a no-op once the directory
            // has been moved
            fs::rename(&output_dir, &path)
                .with_context(|| format!("Failed to stage asset at {}", path.display()))?;
        }

        info!("[{}] Staged asset {}", package, path.display());
        Ok(StagedAsset {
            package_name: package.clone(),
            hash,
            path,
            bundled_locally,
        })
    }

    /// Copy a staged asset into a build context next to it, together with
    /// the function's Dockerfile
    pub fn prepare_image(
        &self,
        staged: &StagedAsset,
        function: &DockerImageFunction,
    ) -> Result<ImageAsset> {
        if !staged.path.exists() {
            info!(
                "[{}] Asset directory does not exist, creating an empty one",
                staged.package_name
            );
            fs::create_dir_all(&staged.path)?;
        }

        let work_dir = PathBuf::from(format!("{}-docker", staged.path.display()));
        if work_dir.exists() {
            fs::remove_dir_all(&work_dir)?;
        }
        copy_tree(&staged.path, &work_dir)?;

        fs::copy(&function.dockerfile, work_dir.join("Dockerfile")).with_context(|| {
            format!(
                "[{}] Failed to copy {}",
                function.package_name,
                function.dockerfile.display()
            )
        })?;
        fs::write(work_dir.join(".dockerignore"), "Dockerfile\n.dockerignore\n")?;

        Ok(ImageAsset {
            asset_name: function.package_name.clone(),
            directory: work_dir,
            build_args: function.build_args.clone(),
            platform: function.platform.ecr_platform.to_string(),
            cmd: function.cmd.clone(),
        })
    }
}

/// Hash of every path and file content under `dir`, independent of
/// timestamps and traversal order
pub fn hash_directory(dir: &Path) -> Result<String> {
    let mut index = String::new();

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = relative_name(dir, entry.path())?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            index.push_str(&format!("d {}\n", relative));
        } else if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            index.push_str(&format!("l {} {}\n", relative, target.display()));
        } else {
            let contents = fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            index.push_str(&format!("f {} {}\n", relative, sha256::digest(&contents)));
        }
    }

    Ok(sha256::digest(index))
}

/// Write `dir` as a zip whose bytes only depend on the tree's paths and
/// contents. Every entry carries the `epoch` timestamp.
pub fn package_zip(dir: &Path, zip_path: &Path, epoch: i64) -> Result<()> {
    let modified = zip_timestamp(epoch)?;
    let base = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(modified);

    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = relative_name(dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), base.unix_permissions(0o755))?;
            continue;
        }
        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path())?;
            zip.add_symlink(name, target.to_string_lossy(), base)?;
            continue;
        }

        let mode = if is_executable(entry.path()) { 0o755 } else { 0o644 };
        zip.start_file(name, base.unix_permissions(mode))?;
        let contents = fs::read(entry.path())?;
        zip.write_all(&contents)?;
    }

    zip.finish()?;
    debug!("Wrote {}", zip_path.display());
    Ok(())
}

fn zip_timestamp(epoch: i64) -> Result<zip::DateTime> {
    let time = chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0)
        .ok_or_else(|| anyhow!("Invalid epoch: {}", epoch))?;
    let year = u16::try_from(time.year()).context("Epoch year out of range")?;
    zip::DateTime::from_date_and_time(
        year,
        time.month() as u8,
        time.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
    )
    .map_err(|_| anyhow!("Epoch {} cannot be stored in a zip archive", epoch))
}

fn reset_dir(dir: &Path) -> Result<()> {
    if fs::read_dir(dir)?.next().is_some() {
        debug!("Clearing partial output in {}", dir.display());
        fs::remove_dir_all(dir)?;
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn relative_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .with_context(|| format!("{} is outside {}", path.display(), base.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let target = to.join(entry.path().strip_prefix(from)?);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_symlink() {
            copy_link(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_link(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(&points_to, target)
        .with_context(|| format!("Failed to link {}", target.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_link(link: &Path, target: &Path) -> Result<()> {
    anyhow::bail!(
        "Cannot copy symlink {} to {} on this platform",
        link.display(),
        target.display()
    )
}
