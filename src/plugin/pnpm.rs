//! pnpm plugin
//!
//! Detects `pnpm-lock.yaml` and runs `pnpm outdated --format json`, whose
//! report has the same shape as npm's.

use super::node::{complete_listing, parse_outdated_object};
use super::{interpret_output, PackageManagerPlugin, PluginContext};
use crate::domain::RawDependency;
use crate::error::PluginError;
use crate::process::display_command;
use async_trait::async_trait;
use std::path::Path;

const PNPM_COMMAND: &str = "pnpm";
const PNPM_MARKERS: &[&str] = &["pnpm-lock.yaml"];

/// pnpm backend
pub struct PnpmPlugin {
    context: PluginContext,
}

impl PnpmPlugin {
    /// Create a new pnpm plugin
    pub fn new(context: PluginContext) -> Self {
        Self { context }
    }

    fn args() -> Vec<String> {
        ["outdated", "--format", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

#[async_trait]
impl PackageManagerPlugin for PnpmPlugin {
    fn id(&self) -> &'static str {
        "pnpm"
    }

    fn marker_files(&self) -> &'static [&'static str] {
        PNPM_MARKERS
    }

    async fn list_dependencies(
        &self,
        project_dir: &Path,
    ) -> Result<Vec<RawDependency>, PluginError> {
        let args = Self::args();
        let command = display_command(PNPM_COMMAND, &args);
        let result = self
            .context
            .runner
            .exec(PNPM_COMMAND, &args, &self.context.exec_options(project_dir))
            .await;

        let outdated = interpret_output(self.id(), &command, &result, parse_outdated_object)?
            .unwrap_or_default();

        complete_listing(self.context.fs.as_ref(), self.id(), project_dir, outdated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::testing::{context, MockRunner};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_detect() {
        let dir = TempDir::new().unwrap();
        let plugin = PnpmPlugin::new(context(Arc::new(MockRunner::stdout("", 0))));
        assert!(!plugin.detect(dir.path()));

        fs::write(dir.path().join("pnpm-lock.yaml"), "lockfileVersion: '9.0'\n").unwrap();
        assert!(plugin.detect(dir.path()));
    }

    #[tokio::test]
    async fn test_list_dependencies() {
        let dir = TempDir::new().unwrap();
        let stdout = r#"{
            "vite": {"current": "4.5.0", "latest": "5.2.0", "wanted": "4.5.3", "isDeprecated": false, "dependencyType": "devDependencies"}
        }"#;
        let runner = Arc::new(MockRunner::stdout(stdout, 1));
        let plugin = PnpmPlugin::new(context(runner.clone()));

        let deps = plugin.list_dependencies(dir.path()).await.unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].wanted_version.as_deref(), Some("4.5.3"));

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].0, "pnpm");
        assert_eq!(calls[0].1, vec!["outdated", "--format", "json"]);
    }

    #[tokio::test]
    async fn test_list_dependencies_stderr_only_failure() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(MockRunner::new(crate::process::ExecResult::new(
            "",
            "ERR_PNPM_NO_IMPORTER_MANIFEST_FOUND",
            1,
        )));
        let plugin = PnpmPlugin::new(context(runner));
        let err = plugin.list_dependencies(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("ERR_PNPM_NO_IMPORTER_MANIFEST_FOUND"));
    }
}
