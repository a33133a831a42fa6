//! Bundling of a package's runtime dependencies
//!
//! Produces the build recipe, decides whether the host may run it directly
//! and describes the containerized fallback.

pub mod cache;
pub mod docker;
pub mod local;
pub mod process;
pub mod recipe;


pub use cache::discover_cache_dir;
pub use docker::{DockerBundling, DockerVolume};
pub use local::{
    check_local_eligibility, Eligibility, HostProbe, LocalBundling, LocalFailurePolicy,
    SystemHost, UvLocalBundling,
};
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
pub use recipe::{build_asset_command_and_env, project_environment, BundleRecipe};

/// Local hook plus containerized fallback for one asset
pub struct BundlingOptions {
    pub docker: DockerBundling,
    pub local: Box<dyn LocalBundling>,
}
