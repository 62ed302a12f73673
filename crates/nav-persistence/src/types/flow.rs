//! Saved state of one flow's result manager.

use std::collections::{BTreeMap, BTreeSet};

use nav_model::{CachedStepResult, StepId};
use serde::{Deserialize, Serialize};

/// Cached step results and the steps whose defaults were already applied.
///
/// Transient steps never appear here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowResultsSnapshot {
    pub results: BTreeMap<StepId, CachedStepResult>,
    pub defaults_initialized: BTreeSet<StepId>,
}

impl FlowResultsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.defaults_initialized.is_empty()
    }
}
