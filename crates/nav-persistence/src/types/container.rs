//! Saved backstack of one container.

use std::collections::BTreeMap;

use nav_model::{Backstack, DestinationInstance, InstanceId};
use serde::{Deserialize, Serialize};

/// A container's backstack as ordered ids plus the instance records they name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSnapshot {
    /// Instance ids in history order.
    pub backstack: Vec<InstanceId>,
    /// Instance records keyed by id.
    pub instances: BTreeMap<InstanceId, DestinationInstance>,
}

impl ContainerSnapshot {
    pub fn from_backstack(backstack: &Backstack) -> Self {
        Self {
            backstack: backstack.ids().cloned().collect(),
            instances: backstack
                .iter()
                .map(|instance| (instance.id().clone(), instance.clone()))
                .collect(),
        }
    }

    /// Rebuild the backstack. Ids without an instance record are skipped.
    pub fn to_backstack(&self) -> Backstack {
        self.backstack
            .iter()
            .filter_map(|id| {
                let instance = self.instances.get(id);
                if instance.is_none() {
                    tracing::warn!(instance = %id, "Saved backstack names an unknown instance");
                }
                instance.cloned()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_model::{Capabilities, Descriptor, DescriptorId, NavigationDirection};

    fn instance(kind: &str) -> DestinationInstance {
        DestinationInstance::new(
            Descriptor::new(
                DescriptorId::new(kind).unwrap(),
                Capabilities::push_only(),
                serde_json::Value::Null,
            ),
            NavigationDirection::Push,
        )
    }

    #[test]
    fn backstack_order_survives() {
        let backstack = Backstack::from_instances([instance("a"), instance("b"), instance("c")]);
        let snapshot = ContainerSnapshot::from_backstack(&backstack);
        assert_eq!(snapshot.backstack.len(), 3);
        assert_eq!(snapshot.to_backstack(), backstack);
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let a = instance("a");
        let mut snapshot =
            ContainerSnapshot::from_backstack(&Backstack::from_instances([a.clone()]));
        snapshot.backstack.insert(0, InstanceId::new("gone").unwrap());

        let restored = snapshot.to_backstack();
        assert_eq!(restored.len(), 1);
        assert!(restored.contains(a.id()));
    }
}
