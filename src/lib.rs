pub mod app;
pub mod asset;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod function;
pub mod platform;
pub mod service;
pub mod verify;

#[cfg(test)]
mod testing;

pub use anyhow::Result;
