//! Service layer for business logic orchestration
//!
//! This module contains the service layer that orchestrates bundling and
//! synthesis, separating concerns from the CLI layer in main.rs.

pub mod bundle;
pub mod synth;


pub use bundle::{BundlePlan, BundleService};
pub use synth::SynthService;
