//! Wiring of concrete collaborators into a ready-to-use service

use crate::config::DoctorConfig;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::plugin::{builtin_plugins, PluginContext, PluginRegistry};
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::service::DependencyService;
use std::sync::{Arc, Once};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static LOGGING: Once = Once::new();

/// Initialize the tracing subscriber once per process.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
pub fn init_logging(debug: bool) {
    LOGGING.call_once(|| {
        let filter = if debug {
            EnvFilter::new("dep_doctor=debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dep_doctor=warn"))
        };

        // A subscriber installed elsewhere (e.g. by a host application) is kept.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init();
    });
}

/// Build a service with the system process runner, the tokio file system and
/// every built-in plugin
pub fn build_service(config: &DoctorConfig) -> DependencyService {
    build_service_with(
        config,
        Arc::new(SystemProcessRunner::new()),
        Arc::new(TokioFileSystem::new()),
    )
}

/// Build a service over caller-supplied collaborators
pub fn build_service_with(
    config: &DoctorConfig,
    runner: Arc<dyn ProcessRunner>,
    fs: Arc<dyn FileSystem>,
) -> DependencyService {
    let context = PluginContext::new(runner, fs)
        .with_timeout(config.exec_timeout)
        .with_env(config.env.clone());
    let registry = PluginRegistry::new().with_plugins(builtin_plugins(&context));

    tracing::debug!(plugins = ?registry.ids(), "service assembled");

    DependencyService::new(registry).with_merge_policy(config.merge_policy)
}
