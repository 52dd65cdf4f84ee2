//! npm plugin
//!
//! Detects `package-lock.json` / `npm-shrinkwrap.json` and runs
//! `npm outdated --json`.

use super::node::{complete_listing, parse_outdated_object};
use super::{interpret_output, PackageManagerPlugin, PluginContext};
use crate::domain::RawDependency;
use crate::error::PluginError;
use crate::process::display_command;
use async_trait::async_trait;
use std::path::Path;

const NPM_COMMAND: &str = "npm";
const NPM_MARKERS: &[&str] = &["package-lock.json", "npm-shrinkwrap.json"];

/// npm backend
pub struct NpmPlugin {
    context: PluginContext,
}

impl NpmPlugin {
    /// Create a new npm plugin
    pub fn new(context: PluginContext) -> Self {
        Self { context }
    }

    fn args() -> Vec<String> {
        vec!["outdated".to_string(), "--json".to_string()]
    }
}

#[async_trait]
impl PackageManagerPlugin for NpmPlugin {
    fn id(&self) -> &'static str {
        "npm"
    }

    fn marker_files(&self) -> &'static [&'static str] {
        NPM_MARKERS
    }

    async fn list_dependencies(
        &self,
        project_dir: &Path,
    ) -> Result<Vec<RawDependency>, PluginError> {
        let args = Self::args();
        let command = display_command(NPM_COMMAND, &args);
        let result = self
            .context
            .runner
            .exec(NPM_COMMAND, &args, &self.context.exec_options(project_dir))
            .await;

        let outdated = interpret_output(self.id(), &command, &result, parse_outdated_object)?
            .unwrap_or_default();
        tracing::debug!(plugin = self.id(), outdated = outdated.len(), "parsed npm outdated");

        complete_listing(self.context.fs.as_ref(), self.id(), project_dir, outdated).await
    }
}
