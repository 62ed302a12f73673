//! Transitions: the diff between two backstacks.

use std::collections::{HashMap, HashSet};

use crate::backstack::Backstack;
use crate::ids::InstanceId;
use crate::instance::DestinationInstance;

/// Which instances a backstack change opened, closed, or retained.
///
/// - `opened` = target − previous, in target order
/// - `closed` = previous − target, in previous order
/// - `retained` = previous ∩ target, in target order
/// - `updated` = retained instances whose metadata differs from previous
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    previous: Backstack,
    target: Backstack,
    opened: Vec<DestinationInstance>,
    closed: Vec<DestinationInstance>,
    retained: Vec<DestinationInstance>,
    updated: Vec<DestinationInstance>,
}

impl Transition {
    pub fn between(previous: &Backstack, target: &Backstack) -> Self {
        let previous_by_id: HashMap<&InstanceId, &DestinationInstance> = previous
            .iter()
            .map(|instance| (instance.id(), instance))
            .collect();
        let target_ids: HashSet<&InstanceId> = target.ids().collect();

        let mut opened = Vec::new();
        let mut retained = Vec::new();
        let mut updated = Vec::new();
        for instance in target {
            match previous_by_id.get(instance.id()) {
                Some(before) => {
                    if before.metadata() != instance.metadata() {
                        updated.push(instance.clone());
                    }
                    retained.push(instance.clone());
                }
                None => opened.push(instance.clone()),
            }
        }
        let closed = previous
            .iter()
            .filter(|instance| !target_ids.contains(instance.id()))
            .cloned()
            .collect();

        Self {
            previous: previous.clone(),
            target: target.clone(),
            opened,
            closed,
            retained,
            updated,
        }
    }

    pub fn previous(&self) -> &Backstack {
        &self.previous
    }

    pub fn target(&self) -> &Backstack {
        &self.target
    }

    pub fn opened(&self) -> &[DestinationInstance] {
        &self.opened
    }

    pub fn closed(&self) -> &[DestinationInstance] {
        &self.closed
    }

    pub fn retained(&self) -> &[DestinationInstance] {
        &self.retained
    }

    /// Retained instances published with changed metadata.
    pub fn updated(&self) -> &[DestinationInstance] {
        &self.updated
    }

    pub fn is_closing(&self, id: &InstanceId) -> bool {
        self.closed.iter().any(|instance| instance.id() == id)
    }

    pub fn is_opening(&self, id: &InstanceId) -> bool {
        self.opened.iter().any(|instance| instance.id() == id)
    }

    pub fn previous_active(&self) -> Option<&DestinationInstance> {
        self.previous.active()
    }

    pub fn target_active(&self) -> Option<&DestinationInstance> {
        self.target.active()
    }

    pub fn active_changed(&self) -> bool {
        self.previous_active().map(DestinationInstance::id)
            != self.target_active().map(DestinationInstance::id)
    }

    /// True when nothing was opened, closed, or updated and the order is
    /// unchanged.
    pub fn is_empty(&self) -> bool {
        self.opened.is_empty()
            && self.closed.is_empty()
            && self.updated.is_empty()
            && self.previous.ids().eq(self.target.ids())
    }
}
