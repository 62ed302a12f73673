//! Backstacks: ordered navigation history for one scope.

use serde::{Deserialize, Serialize};

use crate::ids::InstanceId;
use crate::instance::DestinationInstance;

/// Ordered sequence of instances; insertion order is navigation order.
///
/// The last element is conventionally the active one. Ids are unique. Every
/// operation returns a new backstack and leaves `self` untouched, so callers
/// can always diff the previous value against the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DestinationInstance>", into = "Vec<DestinationInstance>")]
pub struct Backstack {
    instances: Vec<DestinationInstance>,
}

impl Backstack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backstack from instances in history order.
    ///
    /// If an id occurs more than once, the later occurrence wins and the
    /// earlier one is dropped.
    pub fn from_instances(instances: impl IntoIterator<Item = DestinationInstance>) -> Self {
        let mut deduped: Vec<DestinationInstance> = Vec::new();
        for instance in instances {
            if let Some(index) = deduped.iter().position(|existing| existing == &instance) {
                deduped.remove(index);
            }
            deduped.push(instance);
        }
        Self { instances: deduped }
    }

    /// Append an instance. An instance already present moves to the top.
    #[must_use]
    pub fn push(&self, instance: DestinationInstance) -> Self {
        let mut instances: Vec<_> = self
            .instances
            .iter()
            .filter(|existing| *existing != &instance)
            .cloned()
            .collect();
        instances.push(instance);
        Self { instances }
    }

    /// Remove an instance by id. Closing an absent id returns an equal backstack.
    #[must_use]
    pub fn close(&self, id: &InstanceId) -> Self {
        Self {
            instances: self
                .instances
                .iter()
                .filter(|instance| instance.id() != id)
                .cloned()
                .collect(),
        }
    }

    /// Replace the topmost instance matching `predicate` with `instance`,
    /// keeping its position.
    ///
    /// Returns an equal backstack when nothing matches. Any other entry with
    /// the replacement's id is dropped to keep ids unique.
    #[must_use]
    pub fn replace<P>(&self, predicate: P, instance: DestinationInstance) -> Self
    where
        P: Fn(&DestinationInstance) -> bool,
    {
        let Some(target) = self.instances.iter().rposition(|existing| predicate(existing)) else {
            return self.clone();
        };
        let instances = self
            .instances
            .iter()
            .enumerate()
            .filter_map(|(index, existing)| {
                if index == target {
                    Some(instance.clone())
                } else if existing == &instance {
                    None
                } else {
                    Some(existing.clone())
                }
            })
            .collect();
        Self { instances }
    }

    /// The conventionally active (last) instance.
    pub fn active(&self) -> Option<&DestinationInstance> {
        self.instances.last()
    }

    pub fn get(&self, id: &InstanceId) -> Option<&DestinationInstance> {
        self.instances.iter().find(|instance| instance.id() == id)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.get(id).is_some()
    }

    pub fn position(&self, id: &InstanceId) -> Option<usize> {
        self.instances.iter().position(|instance| instance.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &InstanceId> {
        self.instances.iter().map(DestinationInstance::id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DestinationInstance> {
        self.instances.iter()
    }

    pub fn as_slice(&self) -> &[DestinationInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl From<Vec<DestinationInstance>> for Backstack {
    fn from(instances: Vec<DestinationInstance>) -> Self {
        Self::from_instances(instances)
    }
}

impl From<Backstack> for Vec<DestinationInstance> {
    fn from(backstack: Backstack) -> Self {
        backstack.instances
    }
}

impl FromIterator<DestinationInstance> for Backstack {
    fn from_iter<I: IntoIterator<Item = DestinationInstance>>(iter: I) -> Self {
        Self::from_instances(iter)
    }
}

impl<'a> IntoIterator for &'a Backstack {
    type Item = &'a DestinationInstance;
    type IntoIter = std::slice::Iter<'a, DestinationInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}
