//! Saving and restoring navigation state.

use std::path::Path;

use nav_model::ContainerKey;
use nav_persistence::{ContainerSnapshot, NavigationSnapshot};

use super::NavigationController;
use crate::dispatch::Dispatch;
use crate::error::Result;
use crate::flow::FlowResultManager;
use crate::instruction::NavigationInstruction;

impl NavigationController {
    /// Capture every backstack, undelivered result, and flow result cache.
    ///
    /// Restored state that no container or flow has claimed yet is carried
    /// over unchanged.
    pub fn snapshot(&self) -> NavigationSnapshot {
        let mut snapshot = self.restored.clone();
        for container in self.containers.values() {
            snapshot.containers.insert(
                container.key().clone(),
                ContainerSnapshot::from_backstack(container.backstack()),
            );
        }
        snapshot
            .pending_results
            .extend(self.results.pending().iter().cloned());
        for entry in self.flows.values() {
            snapshot
                .flows
                .insert(entry.id().clone(), entry.manager().snapshot());
        }
        snapshot
    }

    /// Apply saved state.
    ///
    /// Live containers take their saved backstack now, without running
    /// interceptors; the rest is kept until a container or flow with a
    /// matching key is created. Instance ids are preserved, so queued
    /// results still find their owners.
    pub fn restore(&mut self, snapshot: NavigationSnapshot) -> Result<Dispatch> {
        let NavigationSnapshot {
            containers,
            pending_results,
            flows,
        } = snapshot;
        self.restored = NavigationSnapshot::new();
        let mut dispatch = Dispatch::default();

        // Hosts first: committing a parent can tear down the containers
        // nested under it, whose saved state is then stashed for re-creation.
        let mut containers: Vec<_> = containers.into_iter().collect();
        containers.sort_by_key(|(key, _)| self.container_depth(key));
        for (key, saved) in containers {
            if !self.containers.contains_key(&key) {
                self.restored.containers.insert(key, saved);
                continue;
            }
            let backstack = saved.to_backstack();
            let cause = NavigationInstruction::set_backstack(key.clone(), backstack.clone());
            dispatch.merge(self.commit_unintercepted(&key, backstack, &cause)?);
        }

        for (id, saved) in flows {
            let Some(entry) = self.flows.get_mut(&id) else {
                self.restored.flows.insert(id, saved);
                continue;
            };
            entry.replace_manager(FlowResultManager::from_snapshot(saved));
            if let Some(container) = self.containers.get(entry.container()) {
                entry.adopt(container.backstack());
            }
            dispatch.merge(self.sync_flow(&id)?);
        }

        let restored_results = pending_results.len();
        for result in pending_results {
            self.results.post(result);
        }
        self.flush_results()?;

        tracing::debug!(
            containers = self.containers.len(),
            stashed_containers = self.restored.containers.len(),
            stashed_flows = self.restored.flows.len(),
            pending_results = restored_results,
            "Restored navigation state"
        );
        Ok(dispatch)
    }

    /// Number of contexts above a live container; unknown containers last.
    fn container_depth(&self, key: &ContainerKey) -> usize {
        self.containers
            .get(key)
            .map_or(usize::MAX, |container| {
                self.contexts.ancestry(container.owner()).len()
            })
    }

    /// Encode the current snapshot as JSON bytes for the host to store.
    pub fn encode_state(&self) -> Result<Vec<u8>> {
        Ok(nav_persistence::encode_snapshot(&self.snapshot())?)
    }

    pub fn restore_encoded(&mut self, bytes: &[u8]) -> Result<Dispatch> {
        let snapshot = nav_persistence::decode_snapshot(bytes)?;
        self.restore(snapshot)
    }

    /// Write the current snapshot to `path` atomically.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        nav_persistence::save_snapshot(&self.snapshot(), path)?;
        tracing::debug!(path = %path.display(), "Saved navigation state");
        Ok(())
    }

    pub fn restore_from(&mut self, path: &Path) -> Result<Dispatch> {
        let snapshot = nav_persistence::load_snapshot(path)?;
        self.restore(snapshot)
    }
}
