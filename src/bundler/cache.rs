use super::process::ProcessRunner;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Locate the host's uv cache so the bundling container can reuse it.
/// Failing to find one only means no cache mount.
pub fn discover_cache_dir(package_name: &str, runner: &dyn ProcessRunner) -> Option<PathBuf> {
    let args = ["uv", "cache", "dir"].map(String::from);
    match runner.run(&args, &BTreeMap::new(), None) {
        Ok(output) => {
            let dir = output.stdout.trim();
            if dir.is_empty() {
                info!(
                    "[{}] uv reported no cache dir, not using cache dir mount...",
                    package_name
                );
                return None;
            }
            info!("[{}] found uv cache dir {}", package_name, dir);
            Some(PathBuf::from(dir))
        }
        Err(_) => {
            info!(
                "[{}] Local uv could not be found, not using cache dir mount...",
                package_name
            );
            None
        }
    }
}
