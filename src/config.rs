//! Runtime configuration for an analysis run

use crate::cli::CliArgs;
use crate::plugin::DEFAULT_EXEC_TIMEOUT;
use crate::service::{AnalysisRequest, MergePolicy};
use std::collections::HashMap;
use std::time::Duration;

/// Settings that shape how the service and its plugins are assembled
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorConfig {
    /// Timeout for each package manager command
    pub exec_timeout: Duration,
    /// Overall deadline for the analysis, if any
    pub deadline: Option<Duration>,
    /// Conflict resolution between plugins reporting the same name
    pub merge_policy: MergePolicy,
    /// Extra environment for every package manager command
    pub env: HashMap<String, String>,
    /// Force a single plugin, bypassing marker detection
    pub manager: Option<String>,
}

impl Default for DoctorConfig {
    fn default() -> Self {
        Self {
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            deadline: None,
            merge_policy: MergePolicy::default(),
            env: HashMap::new(),
            manager: None,
        }
    }
}

impl DoctorConfig {
    /// Build configuration from parsed CLI arguments. Later `--env` values
    /// for the same key win.
    pub fn from_cli(args: &CliArgs) -> Self {
        Self {
            exec_timeout: args.timeout,
            deadline: args.deadline,
            merge_policy: args.merge,
            env: args.env.iter().cloned().collect(),
            manager: args.manager.clone(),
        }
    }

    /// Per-run options handed to the service
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            manager: self.manager.clone(),
            deadline: self.deadline,
        }
    }
}
