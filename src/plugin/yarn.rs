//! Yarn (classic) plugin
//!
//! Detects `yarn.lock` and runs `yarn outdated --json`. Output is
//! line-delimited JSON; the outdated packages are in the `table` event:
//!
//! ```text
//! {"type":"info","data":"Color legend : ..."}
//! {"type":"table","data":{"head":["Package","Current","Wanted","Latest",...],"body":[[...]]}}
//! ```

use super::node::complete_listing;
use super::{interpret_output, PackageManagerPlugin, PluginContext};
use crate::domain::RawDependency;
use crate::error::PluginError;
use crate::process::display_command;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

const YARN_COMMAND: &str = "yarn";
const YARN_MARKERS: &[&str] = &["yarn.lock"];

/// Yarn backend
pub struct YarnPlugin {
    context: PluginContext,
}

/// One line of `yarn --json` output
#[derive(Debug, Deserialize)]
struct YarnEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of the `table` event
#[derive(Debug, Deserialize)]
struct YarnTable {
    head: Vec<String>,
    body: Vec<Vec<String>>,
}

impl YarnPlugin {
    /// Create a new yarn plugin
    pub fn new(context: PluginContext) -> Self {
        Self { context }
    }

    fn args() -> Vec<String> {
        vec!["outdated".to_string(), "--json".to_string()]
    }
}

/// Parse `yarn outdated --json` output.
///
/// Yarn exits 1 when something is outdated, so a non-zero exit must come
/// with a `table` event; without one the listing is incomplete.
fn parse_outdated_lines(stdout: &str, exited_cleanly: bool) -> Result<Vec<RawDependency>, String> {
    let mut parsed_any = false;
    let mut saw_table = false;
    let mut dependencies = Vec::new();

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Ok(event) = serde_json::from_str::<YarnEvent>(line) else {
            continue;
        };
        parsed_any = true;

        match event.kind.as_str() {
            "table" => {
                saw_table = true;
                let table: YarnTable =
                    serde_json::from_value(event.data).map_err(|e| e.to_string())?;
                dependencies.extend(table_rows(&table)?);
            }
            "error" => {
                let message = event
                    .data
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| event.data.to_string());
                return Err(message);
            }
            _ => {}
        }
    }

    if !parsed_any {
        return Err("no JSON events in yarn output".to_string());
    }
    if !saw_table && !exited_cleanly {
        return Err("yarn exited with an error before reporting outdated packages".to_string());
    }

    Ok(dependencies)
}

fn table_rows(table: &YarnTable) -> Result<Vec<RawDependency>, String> {
    let column = |name: &str| {
        table
            .head
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    };

    let name_col = column("package").ok_or("table has no Package column")?;
    let current_col = column("current");
    let wanted_col = column("wanted");
    let latest_col = column("latest");

    let cell = |row: &[String], col: Option<usize>| -> Option<String> {
        col.and_then(|i| row.get(i))
            .filter(|v| !v.is_empty())
            .cloned()
    };

    Ok(table
        .body
        .iter()
        .filter_map(|row| {
            let name = row.get(name_col)?.clone();
            Some(RawDependency {
                name,
                version: cell(row, current_col),
                wanted_version: cell(row, wanted_col),
                latest_version: cell(row, latest_col),
            })
        })
        .collect())
}

#[async_trait]
impl PackageManagerPlugin for YarnPlugin {
    fn id(&self) -> &'static str {
        "yarn"
    }

    fn marker_files(&self) -> &'static [&'static str] {
        YARN_MARKERS
    }

    async fn list_dependencies(
        &self,
        project_dir: &Path,
    ) -> Result<Vec<RawDependency>, PluginError> {
        let args = Self::args();
        let command = display_command(YARN_COMMAND, &args);
        let result = self
            .context
            .runner
            .exec(YARN_COMMAND, &args, &self.context.exec_options(project_dir))
            .await;

        let exited_cleanly = result.success();
        let outdated = interpret_output(self.id(), &command, &result, |stdout| {
            parse_outdated_lines(stdout, exited_cleanly)
        })?
        .unwrap_or_default();

        complete_listing(self.context.fs.as_ref(), self.id(), project_dir, outdated).await
    }
}
