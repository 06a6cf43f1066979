//! Coordinator settings a host can embed in its own configuration.

use serde::{Deserialize, Serialize};

use crate::gateway::DEFAULT_BASE_URL;

/// What to do with a fetch that resolves after a newer command already did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Every completion commits; the fetch that resolves last decides what is shown.
    #[default]
    LastResolved,
    /// Completions older than the newest committed command are dropped.
    LatestIssued,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub base_url: String,
    pub completion_policy: CompletionPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            completion_policy: CompletionPolicy::default(),
        }
    }
}
