//! Cached step results of one flow.

use std::collections::{BTreeMap, BTreeSet};

use nav_model::{CachedStepResult, DependencyHash, ResultPayload, StepId};
use nav_persistence::FlowResultsSnapshot;

/// Step results keyed by step, each stored with the dependency fingerprint
/// it was produced under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowResultManager {
    results: BTreeMap<StepId, CachedStepResult>,
    defaults_initialized: BTreeSet<StepId>,
    transient: BTreeSet<StepId>,
}

impl FlowResultManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: FlowResultsSnapshot) -> Self {
        Self {
            results: snapshot.results,
            defaults_initialized: snapshot.defaults_initialized,
            transient: BTreeSet::new(),
        }
    }

    /// Saved form. Transient steps are left out.
    pub fn snapshot(&self) -> FlowResultsSnapshot {
        FlowResultsSnapshot {
            results: self
                .results
                .iter()
                .filter(|(step, _)| !self.transient.contains(*step))
                .map(|(step, cached)| (step.clone(), cached.clone()))
                .collect(),
            defaults_initialized: self
                .defaults_initialized
                .iter()
                .filter(|step| !self.transient.contains(*step))
                .cloned()
                .collect(),
        }
    }

    /// Cached result for `step`, if it was produced under `depends_on`.
    ///
    /// A result produced under another fingerprint is discarded.
    pub fn get(&mut self, step: &StepId, depends_on: &DependencyHash) -> Option<&ResultPayload> {
        let stale = self
            .results
            .get(step)
            .is_some_and(|cached| &cached.depends_on != depends_on);
        if stale {
            tracing::debug!(step = %step, "Dependencies changed; discarding cached step result");
            self.results.remove(step);
            return None;
        }
        self.results.get(step).map(|cached| &cached.result)
    }

    /// Cached result without checking dependencies.
    pub fn peek(&self, step: &StepId) -> Option<&ResultPayload> {
        self.results.get(step).map(|cached| &cached.result)
    }

    pub fn set(&mut self, step: StepId, result: ResultPayload, depends_on: DependencyHash) {
        self.results.insert(step, CachedStepResult { result, depends_on });
    }

    /// Seed a step's result. Only the first call for a step has any effect,
    /// and it never overwrites a result that is already there. Returns
    /// whether the default was written.
    pub fn set_default(
        &mut self,
        step: StepId,
        result: ResultPayload,
        depends_on: DependencyHash,
    ) -> bool {
        if !self.defaults_initialized.insert(step.clone()) || self.results.contains_key(&step) {
            return false;
        }
        self.set(step, result, depends_on);
        true
    }

    pub fn clear(&mut self, step: &StepId) -> bool {
        self.results.remove(step).is_some()
    }

    /// Keep `step` out of saved state.
    pub fn mark_transient(&mut self, step: StepId) {
        self.transient.insert(step);
    }

    pub fn is_transient(&self, step: &StepId) -> bool {
        self.transient.contains(step)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
