//! Package manager plugins
//!
//! This module provides:
//! - The `PackageManagerPlugin` trait every backend implements
//! - `PluginRegistry` for registration and marker-file detection
//! - npm, pnpm and yarn backends
//!
//! Each backend runs one CLI invocation per listing and reads manifests
//! through the `FileSystem` collaborator.

mod node;
mod npm;
mod pnpm;
mod registry;
mod yarn;

pub use npm::NpmPlugin;
pub use pnpm::PnpmPlugin;
pub use registry::PluginRegistry;
pub use yarn::YarnPlugin;

use crate::domain::RawDependency;
use crate::error::PluginError;
use crate::fs::FileSystem;
use crate::process::{ExecOptions, ExecResult, ProcessRunner, EXIT_CODE_SPAWN_FAILURE};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default per-command timeout
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(60);

/// Trait for package manager backends
#[async_trait]
pub trait PackageManagerPlugin: Send + Sync {
    /// Stable identifier, e.g. `npm`
    fn id(&self) -> &'static str;

    /// Files whose presence identifies a project managed by this backend
    fn marker_files(&self) -> &'static [&'static str];

    /// Whether this backend applies to `project_dir`. Checks marker files
    /// only; never runs a process.
    fn detect(&self, project_dir: &Path) -> bool {
        self.marker_files()
            .iter()
            .any(|marker| project_dir.join(marker).is_file())
    }

    /// List installed, wanted and latest versions of every declared dependency
    async fn list_dependencies(
        &self,
        project_dir: &Path,
    ) -> Result<Vec<RawDependency>, PluginError>;
}

/// Collaborators and settings shared by all plugins
#[derive(Clone)]
pub struct PluginContext {
    /// Runner used to invoke package manager CLIs
    pub runner: Arc<dyn ProcessRunner>,
    /// File system used for manifest inspection
    pub fs: Arc<dyn FileSystem>,
    /// Timeout for each CLI invocation
    pub timeout: Duration,
    /// Extra environment for every invocation; wins over plugin defaults
    pub env: HashMap<String, String>,
}

impl PluginContext {
    /// Create a context with the default timeout and no extra environment
    pub fn new(runner: Arc<dyn ProcessRunner>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            runner,
            fs,
            timeout: DEFAULT_EXEC_TIMEOUT,
            env: HashMap::new(),
        }
    }

    /// Set the per-command timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set extra environment variables
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Execution options for a CLI run inside `project_dir`
    pub fn exec_options(&self, project_dir: &Path) -> ExecOptions {
        ExecOptions::new()
            .with_cwd(project_dir)
            .with_timeout(self.timeout)
            .with_env("NO_COLOR", "1")
            .with_env("FORCE_COLOR", "0")
            .with_envs(&self.env)
    }
}

/// Create every built-in plugin, in registration order
pub fn builtin_plugins(context: &PluginContext) -> Vec<Arc<dyn PackageManagerPlugin>> {
    vec![
        Arc::new(NpmPlugin::new(context.clone())),
        Arc::new(PnpmPlugin::new(context.clone())),
        Arc::new(YarnPlugin::new(context.clone())),
    ]
}

/// Apply the exit-code rules to a listing command.
///
/// Package managers commonly exit non-zero when updates are available, so a
/// non-zero exit only fails when there is no usable stdout and stderr has
/// something to say. A timed-out run always fails. Returns `Ok(None)` when
/// there is nothing to parse.
pub(crate) fn interpret_output<T, F>(
    plugin: &str,
    command: &str,
    result: &ExecResult,
    parse: F,
) -> Result<Option<T>, PluginError>
where
    F: FnOnce(&str) -> Result<T, String>,
{
    // Output cut off by a timeout is never a complete listing.
    if result.timed_out {
        return Err(PluginError::process(plugin, command, result.stderr.clone()));
    }

    if result.stdout.is_empty() {
        if result.success() {
            return Ok(None);
        }
        if result.exit_code == EXIT_CODE_SPAWN_FAILURE || !result.stderr.is_empty() {
            return Err(PluginError::process(plugin, command, result.stderr.clone()));
        }
        return Ok(None);
    }

    match parse(&result.stdout) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) if !result.success() && !result.stderr.is_empty() => {
            Err(PluginError::process(plugin, command, result.stderr.clone()))
        }
        Err(message) => Err(PluginError::parse(plugin, message)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::EXIT_CODE_TIMEOUT;

    fn parse_ok(s: &str) -> Result<String, String> {
        Ok(s.to_string())
    }

    fn parse_fail(_: &str) -> Result<String, String> {
        Err("not json".to_string())
    }

    #[test]
    fn test_interpret_success() {
        let result = ExecResult::new("{}", "", 0);
        let parsed = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap();
        assert_eq!(parsed, Some("{}".to_string()));
    }

    #[test]
    fn test_interpret_empty_output_is_empty_listing() {
        let result = ExecResult::new("", "", 0);
        let parsed = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_interpret_non_zero_with_valid_stdout() {
        let result = ExecResult::new("{\"a\":{}}", "`npm outdated` exited with status 1", 1);
        let parsed = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap();
        assert!(parsed.is_some());
    }

    #[test]
    fn test_interpret_non_zero_empty_stdout_with_stderr_is_process_failure() {
        let result = ExecResult::new("", "npm ERR! missing script", 1);
        let err = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap_err();
        assert!(matches!(err, PluginError::Process { .. }));
        assert!(err.to_string().contains("missing script"));
    }

    #[test]
    fn test_interpret_non_zero_without_any_output_is_empty() {
        let result = ExecResult::new("", "", 1);
        let parsed = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_interpret_timeout_without_output() {
        let result = ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: EXIT_CODE_TIMEOUT,
            timed_out: true,
        };
        let err = interpret_output("npm", "npm outdated", &result, parse_ok).unwrap_err();
        assert!(matches!(err, PluginError::Process { .. }));
    }

    #[test]
    fn test_interpret_timeout_with_parseable_partial_output() {
        let result = ExecResult {
            stdout: r#"{"type":"info","data":"Color legend"}"#.to_string(),
            stderr: "`yarn outdated --json` timed out after 60s".to_string(),
            exit_code: EXIT_CODE_TIMEOUT,
            timed_out: true,
        };
        let err = interpret_output("yarn", "yarn outdated --json", &result, parse_ok).unwrap_err();
        assert!(matches!(err, PluginError::Process { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_interpret_unparseable_with_stderr_is_process_failure() {
        let result = ExecResult::new("garbage", "boom", 2);
        let err = interpret_output("npm", "npm outdated", &result, parse_fail).unwrap_err();
        assert!(matches!(err, PluginError::Process { .. }));
    }

    #[test]
    fn test_interpret_unparseable_success_is_parse_failure() {
        let result = ExecResult::new("garbage", "", 0);
        let err = interpret_output("npm", "npm outdated", &result, parse_fail).unwrap_err();
        assert!(matches!(err, PluginError::Parse { .. }));
    }

    #[test]
    fn test_exec_options_env_precedence() {
        let runner = Arc::new(testing::MockRunner::stdout("", 0));
        let mut env = HashMap::new();
        env.insert("NO_COLOR".to_string(), "0".to_string());
        env.insert("npm_config_registry".to_string(), "http://localhost".to_string());

        let context = testing::context(runner)
            .with_timeout(Duration::from_secs(5))
            .with_env(env);
        let options = context.exec_options(Path::new("/project"));

        assert_eq!(options.cwd.as_deref(), Some(Path::new("/project")));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.env.get("NO_COLOR").map(String::as_str), Some("0"));
        assert_eq!(options.env.get("FORCE_COLOR").map(String::as_str), Some("0"));
        assert!(options.env.contains_key("npm_config_registry"));
    }

    #[test]
    fn test_builtin_plugins_order() {
        let runner = Arc::new(testing::MockRunner::stdout("", 0));
        let plugins = builtin_plugins(&testing::context(runner));
        let ids: Vec<_> = plugins.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["npm", "pnpm", "yarn"]);
    }
}
