//! Dependency service: the entry point for analyzing a project
//!
//! Workflow: detect plugins → list dependencies concurrently → normalize
//! failures → merge → classify
//!
//! A failing plugin is skipped; only when every applicable plugin fails does
//! the analysis fail.

use crate::domain::{PackageInformation, RawDependency};
use crate::error::{normalize, AnalyzeError, PluginFailure};
use crate::plugin::{PackageManagerPlugin, PluginRegistry};
use futures::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Which plugin wins when two plugins report the same dependency name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The earliest registered plugin keeps the entry
    #[default]
    FirstWins,
    /// A later plugin replaces the entry, keeping its position
    LastWins,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-wins" => Ok(MergePolicy::FirstWins),
            "last" | "last-wins" => Ok(MergePolicy::LastWins),
            other => Err(format!(
                "invalid merge policy '{}': expected 'first' or 'last'",
                other
            )),
        }
    }
}

/// Options for a single analysis
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Run only this plugin, bypassing marker detection
    pub manager: Option<String>,
    /// Overall deadline; in-flight processes are killed when it elapses
    pub deadline: Option<Duration>,
}

/// Result of an analysis, including plugins that were skipped
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Plugins that contributed, in registration order
    pub plugins: Vec<String>,
    /// Merged, classified dependencies
    pub packages: Vec<PackageInformation>,
    /// Plugins that failed and were skipped
    pub skipped: Vec<PluginFailure>,
}

/// Orchestrates plugins for a project directory
#[derive(Debug, Clone)]
pub struct DependencyService {
    registry: Arc<PluginRegistry>,
    merge_policy: MergePolicy,
}

impl DependencyService {
    /// Create a service over a fully configured registry
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            merge_policy: MergePolicy::default(),
        }
    }

    /// Set the merge policy (builder pattern)
    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    /// Analyze every applicable plugin. An unrecognized project yields an
    /// empty list.
    pub async fn analyze(&self, project_dir: &Path) -> Result<Vec<PackageInformation>, AnalyzeError> {
        self.report(project_dir, &AnalysisRequest::default())
            .await
            .map(|r| r.packages)
    }

    /// Analyze with one named plugin, regardless of marker files
    pub async fn analyze_with(
        &self,
        project_dir: &Path,
        plugin_id: &str,
    ) -> Result<Vec<PackageInformation>, AnalyzeError> {
        let request = AnalysisRequest {
            manager: Some(plugin_id.to_string()),
            ..Default::default()
        };
        self.report(project_dir, &request).await.map(|r| r.packages)
    }

    /// Analyze with an overall deadline
    pub async fn analyze_with_deadline(
        &self,
        project_dir: &Path,
        deadline: Duration,
    ) -> Result<Vec<PackageInformation>, AnalyzeError> {
        let request = AnalysisRequest {
            deadline: Some(deadline),
            ..Default::default()
        };
        self.report(project_dir, &request).await.map(|r| r.packages)
    }

    /// Full analysis honouring every option in `request`
    pub async fn report(
        &self,
        project_dir: &Path,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let plugins = match &request.manager {
            Some(id) => vec![self
                .registry
                .get(id)
                .ok_or_else(|| AnalyzeError::unknown_backend(id))?],
            None => self.registry.detect_applicable(project_dir),
        };

        if plugins.is_empty() {
            tracing::info!(dir = %project_dir.display(), "no recognized dependency manifest");
            return Ok(AnalysisReport::default());
        }

        match request.deadline {
            // Dropping the in-flight futures kills their child processes.
            Some(deadline) => tokio::time::timeout(deadline, self.run_plugins(&plugins, project_dir))
                .await
                .map_err(|_| {
                    tracing::warn!(?deadline, "analysis deadline exceeded");
                    AnalyzeError::DeadlineExceeded { deadline }
                })?,
            None => self.run_plugins(&plugins, project_dir).await,
        }
    }

    /// Run plugins concurrently and merge their contributions
    async fn run_plugins(
        &self,
        plugins: &[Arc<dyn PackageManagerPlugin>],
        project_dir: &Path,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let runs = plugins.iter().map(|plugin| async move {
            tracing::debug!(plugin = plugin.id(), "listing dependencies");
            (plugin.id(), plugin.list_dependencies(project_dir).await)
        });
        let outcomes = join_all(runs).await;

        let mut report = AnalysisReport::default();
        let mut contributions = Vec::new();

        for (id, outcome) in outcomes {
            match outcome {
                Ok(dependencies) => {
                    tracing::debug!(plugin = id, count = dependencies.len(), "plugin finished");
                    report.plugins.push(id.to_string());
                    contributions.push(dependencies);
                }
                Err(e) => {
                    let error = normalize(e);
                    tracing::warn!(plugin = id, error = %error, "skipping plugin");
                    report.skipped.push(PluginFailure {
                        plugin: id.to_string(),
                        error,
                    });
                }
            }
        }

        if contributions.is_empty() {
            return Err(AnalyzeError::Aggregate {
                failures: report.skipped,
            });
        }

        report.packages = merge(contributions, self.merge_policy);
        Ok(report)
    }
}

/// Merge per-plugin listings into one report, deduplicating by name
pub fn merge(contributions: Vec<Vec<RawDependency>>, policy: MergePolicy) -> Vec<PackageInformation> {
    let mut packages: Vec<PackageInformation> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for dependency in contributions.into_iter().flatten() {
        match positions.get(&dependency.name) {
            Some(&index) => {
                if policy == MergePolicy::LastWins {
                    packages[index] = dependency.classify();
                }
            }
            None => {
                positions.insert(dependency.name.clone(), packages.len());
                packages.push(dependency.classify());
            }
        }
    }

    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UpgradeType;
    use crate::error::PluginError;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    /// Mock plugin that always applies (or never) and returns canned data
    struct MockPlugin {
        id: &'static str,
        applies: bool,
        delay: Option<Duration>,
        outcome: Result<Vec<RawDependency>, &'static str>,
    }

    impl MockPlugin {
        fn ok(id: &'static str, deps: Vec<RawDependency>) -> Self {
            Self {
                id,
                applies: true,
                delay: None,
                outcome: Ok(deps),
            }
        }

        fn failing(id: &'static str, message: &'static str) -> Self {
            Self {
                id,
                applies: true,
                delay: None,
                outcome: Err(message),
            }
        }

        fn not_applicable(mut self) -> Self {
            self.applies = false;
            self
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl PackageManagerPlugin for MockPlugin {
        fn id(&self) -> &'static str {
            self.id
        }

        fn marker_files(&self) -> &'static [&'static str] {
            &[]
        }

        fn detect(&self, _project_dir: &Path) -> bool {
            self.applies
        }

        async fn list_dependencies(
            &self,
            _project_dir: &Path,
        ) -> Result<Vec<RawDependency>, PluginError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.outcome {
                Ok(deps) => Ok(deps.clone()),
                Err(message) => Err(PluginError::process(self.id, "mock", *message)),
            }
        }
    }

    fn dep(name: &str, version: &str, latest: &str) -> RawDependency {
        RawDependency::new(name)
            .with_version(version)
            .with_wanted(version)
            .with_latest(latest)
    }

    fn service(plugins: Vec<MockPlugin>) -> DependencyService {
        let registry = PluginRegistry::new().with_plugins(
            plugins
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn PackageManagerPlugin>),
        );
        DependencyService::new(registry)
    }

    #[tokio::test]
    async fn test_analyze_no_applicable_plugin_is_empty() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![MockPlugin::ok("npm", vec![]).not_applicable()]);
        let packages = service.analyze(dir.path()).await.unwrap();
        assert!(packages.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_real_registry_without_manifests() {
        let dir = TempDir::new().unwrap();
        let registry = PluginRegistry::new();
        let packages = DependencyService::new(registry)
            .analyze(dir.path())
            .await
            .unwrap();
        assert!(packages.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_classifies_against_latest() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![MockPlugin::ok(
            "npm",
            vec![
                dep("a", "1.0.0", "2.0.0"),
                dep("b", "1.0.0", "1.1.0"),
                dep("c", "1.0.0", "1.0.1"),
                dep("d", "1.0.0", "1.0.0"),
                RawDependency::new("e"),
            ],
        )]);

        let packages = service.analyze(dir.path()).await.unwrap();
        let types: Vec<_> = packages.iter().map(|p| p.upgrade_type()).collect();
        assert_eq!(
            types,
            vec![
                UpgradeType::Major,
                UpgradeType::Minor,
                UpgradeType::Patch,
                UpgradeType::None,
                UpgradeType::Unknown,
            ]
        );
    }

    #[tokio::test]
    async fn test_single_failing_plugin_is_aggregate_failure() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![MockPlugin::failing("npm", "npm not found")]);

        let err = service.analyze(dir.path()).await.unwrap_err();
        match err {
            AnalyzeError::Aggregate { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].plugin, "npm");
                assert!(failures[0].error.message().contains("npm not found"));
                assert!(failures[0].error.cause().is_some());
            }
            other => panic!("expected aggregate failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_plugin_does_not_abort_siblings() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::failing("npm", "boom"),
            MockPlugin::ok("yarn", vec![dep("chalk", "4.1.2", "5.3.0")]),
        ]);

        let report = service
            .report(dir.path(), &AnalysisRequest::default())
            .await
            .unwrap();
        assert_eq!(report.plugins, vec!["yarn"]);
        assert_eq!(report.packages.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].plugin, "npm");
    }

    #[tokio::test]
    async fn test_merge_first_wins_by_default() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::ok("npm", vec![dep("react", "18.0.0", "18.3.1"), dep("zod", "3.0.0", "3.0.0")]),
            MockPlugin::ok("yarn", vec![dep("react", "17.0.2", "18.3.1"), dep("chalk", "5.3.0", "5.3.0")]),
        ]);

        let packages = service.analyze(dir.path()).await.unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["react", "zod", "chalk"]);
        assert_eq!(packages[0].version(), "18.0.0");
    }

    #[tokio::test]
    async fn test_merge_last_wins() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::ok("npm", vec![dep("react", "18.0.0", "18.3.1")]),
            MockPlugin::ok("yarn", vec![dep("react", "17.0.2", "18.3.1")]),
        ])
        .with_merge_policy(MergePolicy::LastWins);

        let packages = service.analyze(dir.path()).await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version(), "17.0.2");
        assert_eq!(packages[0].upgrade_type(), UpgradeType::Major);
    }

    #[tokio::test]
    async fn test_analyze_with_named_plugin() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::ok("npm", vec![dep("react", "18.0.0", "18.3.1")]).not_applicable(),
            MockPlugin::ok("yarn", vec![dep("chalk", "5.3.0", "5.3.0")]),
        ]);

        let packages = service.analyze_with(dir.path(), "npm").await.unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name(), "react");
    }

    #[tokio::test]
    async fn test_analyze_with_unknown_plugin() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![MockPlugin::ok("npm", vec![])]);
        let err = service.analyze_with(dir.path(), "cargo").await.unwrap_err();
        assert!(matches!(err, AnalyzeError::UnknownBackend { ref id } if id == "cargo"));
    }

    #[tokio::test]
    async fn test_plugins_run_concurrently() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::ok("npm", vec![dep("a", "1.0.0", "1.0.0")]).delayed(Duration::from_millis(300)),
            MockPlugin::ok("yarn", vec![dep("b", "1.0.0", "1.0.0")]).delayed(Duration::from_millis(300)),
        ]);

        let started = std::time::Instant::now();
        let packages = service.analyze(dir.path()).await.unwrap();
        assert_eq!(packages.len(), 2);
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![
            MockPlugin::ok("npm", vec![]).delayed(Duration::from_secs(5))
        ]);

        let err = service
            .analyze_with_deadline(dir.path(), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::DeadlineExceeded { .. }));
    }

    #[tokio::test]
    async fn test_deadline_not_reached() {
        let dir = TempDir::new().unwrap();
        let service = service(vec![MockPlugin::ok("npm", vec![dep("a", "1.0.0", "1.2.0")])]);
        let packages = service
            .analyze_with_deadline(dir.path(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(packages.len(), 1);
    }

    #[tokio::test]
    async fn test_detection_uses_marker_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();

        struct YarnLike;

        #[async_trait]
        impl PackageManagerPlugin for YarnLike {
            fn id(&self) -> &'static str {
                "yarn"
            }

            fn marker_files(&self) -> &'static [&'static str] {
                &["yarn.lock"]
            }

            async fn list_dependencies(
                &self,
                _project_dir: &Path,
            ) -> Result<Vec<RawDependency>, PluginError> {
                Ok(vec![RawDependency::new("chalk").with_version("5.3.0").with_latest("5.3.0")])
            }
        }

        let registry = PluginRegistry::new().with_plugins([Arc::new(YarnLike) as Arc<dyn PackageManagerPlugin>]);
        let packages = DependencyService::new(registry)
            .analyze(dir.path())
            .await
            .unwrap();
        assert_eq!(packages[0].upgrade_type(), UpgradeType::None);
    }

    #[test]
    fn test_merge_dedupes_within_one_plugin() {
        let packages = merge(
            vec![vec![dep("a", "1.0.0", "1.0.0"), dep("a", "2.0.0", "2.0.0")]],
            MergePolicy::FirstWins,
        );
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version(), "1.0.0");
    }

    #[test]
    fn test_merge_policy_from_str() {
        assert_eq!("first".parse::<MergePolicy>().unwrap(), MergePolicy::FirstWins);
        assert_eq!("LAST".parse::<MergePolicy>().unwrap(), MergePolicy::LastWins);
        assert!("newest".parse::<MergePolicy>().is_err());
    }
}
