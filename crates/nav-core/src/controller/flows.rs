//! Flow registration and step handling.

use nav_model::{Backstack, ContainerKey, DestinationInstance, FlowId, InstanceId, ResultPayload};

use super::NavigationController;
use crate::dispatch::Dispatch;
use crate::error::{NavigationError, Result};
use crate::flow::{
    FLOW_STEP, FlowEntry, FlowInterrupt, FlowResultManager, FlowScope, FlowStatus, FlowStepTag,
    StepBack,
};
use crate::instruction::NavigationInstruction;
use crate::result::NavigationResult;

impl NavigationController {
    /// Register a flow whose steps are shown in `container`.
    ///
    /// The flow is evaluated immediately. Saved step results for `id` are
    /// picked up if state was restored before registration. `on_finish`
    /// receives the flow's value once, or [`NavigationResult::Closed`] when
    /// the flow is cancelled.
    pub fn register_flow<T, F, C>(
        &mut self,
        id: FlowId,
        container: ContainerKey,
        runner: F,
        on_finish: C,
    ) -> Result<Dispatch>
    where
        T: 'static,
        F: Fn(&mut FlowScope<'_>) -> std::result::Result<T, FlowInterrupt> + 'static,
        C: FnMut(NavigationResult<T>) + 'static,
    {
        if self.flows.contains_key(&id) {
            return Err(NavigationError::DuplicateFlow { flow: id });
        }
        let backstack = self.container_ref(&container)?.backstack().clone();
        let manager = self
            .restored
            .flows
            .remove(&id)
            .map_or_else(FlowResultManager::new, FlowResultManager::from_snapshot);

        let mut entry = FlowEntry::new(id.clone(), container.clone(), manager, runner, on_finish);
        entry.adopt(&backstack);
        self.flows.insert(id.clone(), entry);
        tracing::debug!(flow = %id, container = %container, "Registered flow");

        let dispatch = match self.sync_flow(&id) {
            Ok(dispatch) => dispatch,
            Err(error) => {
                self.flows.remove(&id);
                return Err(error);
            }
        };
        self.flush_results()?;
        Ok(dispatch)
    }

    /// Abandon a flow, removing its steps and telling its callback.
    pub fn cancel_flow(&mut self, id: &FlowId) -> Result<Dispatch> {
        let Some(mut entry) = self.flows.remove(id) else {
            return Ok(Dispatch::default());
        };
        let dispatch = self.strip_steps(id, entry.container())?;
        entry.cancel();
        tracing::debug!(flow = %id, "Cancelled flow");
        Ok(dispatch)
    }

    pub fn has_flow(&self, id: &FlowId) -> bool {
        self.flows.contains_key(id)
    }

    /// Cached step results of a live flow.
    pub fn flow_results(&self, id: &FlowId) -> Option<&FlowResultManager> {
        self.flows.get(id).map(FlowEntry::manager)
    }

    /// Evaluate a flow and make its container show the steps it reached.
    pub(super) fn sync_flow(&mut self, id: &FlowId) -> Result<Dispatch> {
        let Some(entry) = self.flows.get_mut(id) else {
            return Ok(Dispatch::default());
        };
        let status = entry.evaluate()?;
        let container = entry.container().clone();

        match status {
            FlowStatus::Suspended => {
                let steps: Vec<DestinationInstance> = entry.step_instances().cloned().collect();
                tracing::debug!(flow = %id, steps = steps.len(), "Flow waiting for a step");
                let others = self.non_step_instances(id, &container)?;
                let target = Backstack::from_instances(others.into_iter().chain(steps));
                let cause = NavigationInstruction::set_backstack(container.clone(), target.clone());
                self.transition_container(&container, target, &cause)
            }
            FlowStatus::Completed => {
                let Some(mut entry) = self.flows.remove(id) else {
                    return Ok(Dispatch::default());
                };
                let dispatch = self.strip_steps(id, &container)?;
                entry.finish();
                tracing::debug!(flow = %id, "Flow completed");
                Ok(dispatch)
            }
        }
    }

    /// A step instance of `tag.flow` was closed, with `payload` if it
    /// produced a value.
    pub(crate) fn flow_step_closed(
        &mut self,
        tag: &FlowStepTag,
        instance: &InstanceId,
        payload: Option<ResultPayload>,
    ) -> Result<Dispatch> {
        let Some(entry) = self.flows.get_mut(&tag.flow) else {
            // Nothing drives this step any more; let it close.
            tracing::warn!(
                flow = %tag.flow,
                step = %tag.step,
                "Step closed for a flow that is not registered"
            );
            return self.remove_orphan_step(instance);
        };

        match payload {
            Some(payload) => {
                tracing::debug!(flow = %tag.flow, step = %tag.step, "Step answered");
                entry.record_result(&tag.step, payload);
                self.sync_flow(&tag.flow)
            }
            None => match entry.step_back(&tag.step) {
                StepBack::Resume => {
                    tracing::debug!(flow = %tag.flow, step = %tag.step, "Stepped back");
                    self.sync_flow(&tag.flow)
                }
                StepBack::Cancel => self.cancel_flow(&tag.flow),
            },
        }
    }

    fn remove_orphan_step(&mut self, instance: &InstanceId) -> Result<Dispatch> {
        let Some(key) = self.container_holding(instance) else {
            return Ok(Dispatch::default());
        };
        let target = self.container_ref(&key)?.backstack().close(instance);
        let cause = NavigationInstruction::set_backstack(key.clone(), target.clone());
        self.transition_container(&key, target, &cause)
    }

    /// Remove every step of flow `id` from `container`.
    fn strip_steps(&mut self, id: &FlowId, container: &ContainerKey) -> Result<Dispatch> {
        if !self.containers.contains_key(container) {
            return Ok(Dispatch::default());
        }
        let target = Backstack::from_instances(self.non_step_instances(id, container)?);
        let cause = NavigationInstruction::set_backstack(container.clone(), target.clone());
        self.transition_container(container, target, &cause)
    }

    fn non_step_instances(
        &self,
        id: &FlowId,
        container: &ContainerKey,
    ) -> Result<Vec<DestinationInstance>> {
        let backstack = self.container_ref(container)?.backstack();
        Ok(backstack
            .iter()
            .filter(|instance| {
                !instance
                    .metadata()
                    .get(&FLOW_STEP)
                    .is_some_and(|tag| &tag.flow == id)
            })
            .cloned()
            .collect())
    }
}
