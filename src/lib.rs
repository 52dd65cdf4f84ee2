//! dep-doctor - Dependency health reporting library
//!
//! This library asks the package managers a project already uses which
//! dependencies are installed, which versions their ranges allow and which
//! are the latest, then classifies each upgrade as major, minor or patch:
//! - npm (package-lock.json, npm-shrinkwrap.json)
//! - pnpm (pnpm-lock.yaml)
//! - yarn (yarn.lock)
//!
//! The entry point is [`service::DependencyService`]; [`assembly::build_service`]
//! wires it to the real process runner and file system.

pub mod assembly;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fs;
pub mod output;
pub mod plugin;
pub mod process;
pub mod progress;
pub mod service;
