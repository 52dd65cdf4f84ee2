//! Plugin registration and detection

use super::PackageManagerPlugin;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Ordered set of package manager plugins, keyed by id
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn PackageManagerPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A plugin with the same id replaces the existing
    /// entry in place.
    pub fn register(&mut self, plugin: Arc<dyn PackageManagerPlugin>) {
        match self.plugins.iter().position(|p| p.id() == plugin.id()) {
            Some(index) => {
                tracing::debug!(plugin = plugin.id(), "replacing registered plugin");
                self.plugins[index] = plugin;
            }
            None => self.plugins.push(plugin),
        }
    }

    /// Register several plugins (builder pattern)
    pub fn with_plugins(
        mut self,
        plugins: impl IntoIterator<Item = Arc<dyn PackageManagerPlugin>>,
    ) -> Self {
        for plugin in plugins {
            self.register(plugin);
        }
        self
    }

    /// Plugins whose marker files are present in `project_dir`, in
    /// registration order
    pub fn detect_applicable(&self, project_dir: &Path) -> Vec<Arc<dyn PackageManagerPlugin>> {
        self.plugins
            .iter()
            .filter(|p| p.detect(project_dir))
            .cloned()
            .collect()
    }

    /// Look up a plugin by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn PackageManagerPlugin>> {
        self.plugins.iter().find(|p| p.id() == id).cloned()
    }

    /// Registered ids, in registration order
    pub fn ids(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.ids())
            .finish()
    }
}
