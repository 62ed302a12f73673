//! Root snapshot type.

use std::collections::BTreeMap;

use nav_model::{ContainerKey, FlowId, PendingResult};
use serde::{Deserialize, Serialize};

use super::container::ContainerSnapshot;
use super::flow::FlowResultsSnapshot;

/// Everything the navigation core needs to rebuild its state after the host
/// process is recreated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSnapshot {
    /// Backstacks keyed by container.
    pub containers: BTreeMap<ContainerKey, ContainerSnapshot>,
    /// Results produced but not yet delivered, in delivery order.
    pub pending_results: Vec<PendingResult>,
    /// Flow result managers keyed by flow.
    pub flows: BTreeMap<FlowId, FlowResultsSnapshot>,
}

impl NavigationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.pending_results.is_empty() && self.flows.is_empty()
    }
}
