//! Shared helpers for Node.js package managers
//!
//! - Parsing the `{ name: { current, wanted, latest } }` outdated report
//!   produced by npm and pnpm
//! - Reading declared dependencies from package.json
//! - Reading installed versions from node_modules

use crate::domain::RawDependency;
use crate::error::PluginError;
use crate::fs::FileSystem;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Dependency sections of package.json that are reported
const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies", "optionalDependencies"];

/// Parse an outdated report keyed by package name.
///
/// Entries may be a single object or, for workspaces, an array of objects
/// (the first one is used). Missing fields stay `None`.
pub(crate) fn parse_outdated_object(stdout: &str) -> Result<Vec<RawDependency>, String> {
    let value: Value = serde_json::from_str(stdout).map_err(|e| e.to_string())?;
    let Value::Object(map) = value else {
        return Err("expected a JSON object".to_string());
    };

    if let Some(error) = map.get("error") {
        return Err(describe_cli_error(error));
    }

    let mut dependencies = Vec::with_capacity(map.len());
    for (name, entry) in map {
        let entry = match entry {
            Value::Array(entries) => entries.into_iter().next().unwrap_or(Value::Null),
            other => other,
        };
        let fields = entry.as_object();

        dependencies.push(RawDependency {
            version: string_field(fields, "current"),
            wanted_version: string_field(fields, "wanted"),
            latest_version: string_field(fields, "latest"),
            name,
        });
    }

    Ok(dependencies)
}

fn string_field(fields: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    fields
        .and_then(|f| f.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// npm reports CLI failures as `{"error": {"code", "summary", "detail"}}`
fn describe_cli_error(error: &Value) -> String {
    let summary = error.get("summary").and_then(Value::as_str);
    let code = error.get("code").and_then(Value::as_str);
    match (code, summary) {
        (Some(code), Some(summary)) => format!("{}: {}", code, summary),
        (None, Some(summary)) => summary.to_string(),
        _ => error.to_string(),
    }
}

/// Names declared in package.json; empty when there is no package.json
pub(crate) async fn declared_dependencies(
    fs: &dyn FileSystem,
    plugin: &str,
    project_dir: &Path,
) -> Result<Vec<String>, PluginError> {
    let manifest = project_dir.join("package.json");
    if !fs.file_exists(&manifest).await {
        return Ok(Vec::new());
    }

    let content = fs.read_file(&manifest).await.map_err(|e| {
        PluginError::parse(plugin, format!("failed to read {}: {}", manifest.display(), e))
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        PluginError::parse(plugin, format!("failed to parse {}: {}", manifest.display(), e))
    })?;

    let mut names = Vec::new();
    for section in DEPENDENCY_SECTIONS {
        if let Some(deps) = value.get(*section).and_then(Value::as_object) {
            for name in deps.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }

    Ok(names)
}

/// Installed version of `name`, read from node_modules
pub(crate) async fn installed_version(
    fs: &dyn FileSystem,
    project_dir: &Path,
    name: &str,
) -> Option<String> {
    let manifest = project_dir
        .join("node_modules")
        .join(name)
        .join("package.json");
    let content = fs.read_file(&manifest).await.ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    value
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Combine the outdated report with declared dependencies.
///
/// Declared dependencies missing from the report are up to date, so their
/// installed version is also the wanted and latest one. The result is sorted
/// by name.
pub(crate) async fn complete_listing(
    fs: &dyn FileSystem,
    plugin: &str,
    project_dir: &Path,
    outdated: Vec<RawDependency>,
) -> Result<Vec<RawDependency>, PluginError> {
    let mut by_name: BTreeMap<String, RawDependency> = outdated
        .into_iter()
        .map(|dep| (dep.name.clone(), dep))
        .collect();

    for name in declared_dependencies(fs, plugin, project_dir).await? {
        if by_name.contains_key(&name) {
            continue;
        }

        let mut dep = RawDependency::new(name.clone());
        if let Some(installed) = installed_version(fs, project_dir, &name).await {
            dep = dep
                .with_version(installed.clone())
                .with_wanted(installed.clone())
                .with_latest(installed);
        }
        by_name.insert(name, dep);
    }

    Ok(by_name.into_values().collect())
}
