//! Navigation contexts.
//!
//! A context is either a navigation root or the live counterpart of a
//! destination instance sitting in some container's backstack. Contexts own
//! the containers nested under them (by key) and resolve which of those is
//! active. They live in a flat [`ContextArena`] keyed by [`ContextId`];
//! parent links are ids, so the tree never holds references into itself.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use nav_model::{ContainerKey, InstanceId};

use crate::active::ActiveChildTracker;

/// Arena index of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextKind {
    /// A top-level navigation root.
    Root { name: String },
    /// A destination instance placed in `container`.
    Destination { container: ContainerKey },
}

#[derive(Debug, Clone)]
pub struct ContextNode {
    id: ContextId,
    kind: ContextKind,
    instance_id: InstanceId,
    parent: Option<ContextId>,
    containers: ActiveChildTracker<ContainerKey>,
}

impl ContextNode {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn kind(&self) -> &ContextKind {
        &self.kind
    }

    /// Instance id of the destination, or a generated id for roots so they
    /// can own result channels.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, ContextKind::Root { .. })
    }

    /// Container the destination lives in. `None` for roots.
    pub fn container(&self) -> Option<&ContainerKey> {
        match &self.kind {
            ContextKind::Root { .. } => None,
            ContextKind::Destination { container } => Some(container),
        }
    }

    pub fn containers(&self) -> &ActiveChildTracker<ContainerKey> {
        &self.containers
    }

    pub fn containers_mut(&mut self) -> &mut ActiveChildTracker<ContainerKey> {
        &mut self.containers
    }

    /// Child containers with the active one first, then the rest in
    /// registration order.
    pub fn containers_by_priority(&self) -> Vec<ContainerKey> {
        let active = self.containers.active();
        active
            .into_iter()
            .chain(
                self.containers
                    .registered()
                    .iter()
                    .filter(|key| Some(*key) != active),
            )
            .cloned()
            .collect()
    }
}

/// Flat table of live contexts.
#[derive(Debug, Default)]
pub struct ContextArena {
    next_id: u64,
    nodes: BTreeMap<ContextId, ContextNode>,
    by_instance: HashMap<InstanceId, ContextId>,
}

impl ContextArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_root(&mut self, name: impl Into<String>) -> ContextId {
        self.insert(
            ContextKind::Root { name: name.into() },
            InstanceId::generate(),
            None,
        )
    }

    pub fn insert_destination(
        &mut self,
        instance_id: InstanceId,
        container: ContainerKey,
        parent: ContextId,
    ) -> ContextId {
        self.insert(
            ContextKind::Destination { container },
            instance_id,
            Some(parent),
        )
    }

    fn insert(
        &mut self,
        kind: ContextKind,
        instance_id: InstanceId,
        parent: Option<ContextId>,
    ) -> ContextId {
        let id = ContextId(self.next_id);
        self.next_id += 1;
        self.by_instance.insert(instance_id.clone(), id);
        self.nodes.insert(
            id,
            ContextNode {
                id,
                kind,
                instance_id,
                parent,
                containers: ActiveChildTracker::new(),
            },
        );
        id
    }

    /// Remove one node. Child containers are the caller's to tear down.
    pub fn remove(&mut self, id: ContextId) -> Option<ContextNode> {
        let node = self.nodes.remove(&id)?;
        if self.by_instance.get(&node.instance_id) == Some(&id) {
            self.by_instance.remove(&node.instance_id);
        }
        Some(node)
    }

    pub fn get(&self, id: ContextId) -> Option<&ContextNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: ContextId) -> Option<&mut ContextNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn by_instance(&self, instance_id: &InstanceId) -> Option<ContextId> {
        self.by_instance.get(instance_id).copied()
    }

    /// Move a destination context to another container and parent.
    pub fn relocate(&mut self, id: ContextId, container: ContainerKey, parent: ContextId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.kind = ContextKind::Destination { container };
            node.parent = Some(parent);
        }
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn ancestry(&self, id: ContextId) -> Vec<ContextId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            chain.push(node.id);
            current = node.parent.and_then(|parent| self.nodes.get(&parent));
        }
        chain
    }

    pub fn root_of(&self, id: ContextId) -> Option<ContextId> {
        self.ancestry(id).last().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
