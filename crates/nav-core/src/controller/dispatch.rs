//! Instruction handling: routing, interception, and commits.

use nav_model::{
    Backstack, ContainerKey, DestinationInstance, FlowId, InstanceId, NavigationDirection,
    PendingOutcome, PendingResult, ResultPayload, Transition,
};

use super::NavigationController;
use crate::binding::{Binding, SyntheticRequest};
use crate::config::EmptyBehavior;
use crate::context::ContextId;
use crate::dispatch::Dispatch;
use crate::error::{NavigationError, Result};
use crate::instruction::NavigationInstruction;
use crate::interceptor::{OpenDecision, PendingOpen, SideEffect, TransitionDecision};
use crate::result::RESULT_CHANNEL;

impl NavigationController {
    /// Run one instruction through the interceptor pipeline and commit the
    /// resulting backstack changes, then deliver any results that became
    /// deliverable.
    pub fn dispatch(&mut self, instruction: NavigationInstruction) -> Result<Dispatch> {
        let dispatch = self.dispatch_with_redirects(instruction, 0)?;
        self.flush_results()?;
        Ok(dispatch)
    }

    pub(super) fn dispatch_with_redirects(
        &mut self,
        instruction: NavigationInstruction,
        redirects: usize,
    ) -> Result<Dispatch> {
        tracing::trace!(instruction = %instruction, redirects, "Dispatching instruction");
        match &instruction {
            NavigationInstruction::Open { from, instance } => {
                self.dispatch_open(&instruction, *from, instance, redirects)
            }
            NavigationInstruction::Close { id } => self.dispatch_close(&instruction, id, None),
            NavigationInstruction::CloseWithResult { id, payload } => {
                self.dispatch_close(&instruction, id, Some(payload))
            }
            NavigationInstruction::SetBackstack {
                container,
                backstack,
            } => {
                self.container_ref(container)?;
                self.transition_container(container, backstack.clone(), &instruction)
            }
        }
    }

    fn dispatch_open(
        &mut self,
        instruction: &NavigationInstruction,
        from: ContextId,
        instance: &DestinationInstance,
        redirects: usize,
    ) -> Result<Dispatch> {
        if !self.contexts.contains(from) {
            return Err(NavigationError::UnknownContext { context: from });
        }

        let decision = self
            .interceptors
            .evaluate_open(&PendingOpen::new(from, instance, redirects))?;
        match decision {
            OpenDecision::Proceed => {}
            OpenDecision::Cancelled(effect) => return self.cancelled(effect),
            OpenDecision::Redirect(next) => {
                let limit = self.config.max_redirect_depth;
                if redirects >= limit {
                    return Err(NavigationError::RedirectLoop { limit });
                }
                return self.dispatch_with_redirects(next, redirects + 1);
            }
        }

        let descriptor = instance.descriptor();
        if !descriptor.supports(instance.direction()) {
            return Err(NavigationError::UnsupportedDirection {
                descriptor: descriptor.id().clone(),
                direction: instance.direction(),
            });
        }

        let binding = self.bindings.require(descriptor.id())?.clone();
        if let Binding::Synthetic(action) = binding {
            tracing::debug!(
                descriptor = %descriptor.id(),
                from = %from,
                "Running synthetic destination"
            );
            let request = SyntheticRequest {
                from,
                instance: instance.clone(),
            };
            action(self, &request)?;
            return Ok(Dispatch::default());
        }

        let Some(key) = self.route(from, instance) else {
            if self.config.strict_mode {
                return Err(NavigationError::UnhandledInstruction {
                    instruction: instruction.to_string(),
                });
            }
            tracing::warn!(
                instance = %instance.id(),
                descriptor = %descriptor.id(),
                direction = instance.direction().name(),
                "No container accepted open"
            );
            return Ok(Dispatch::default());
        };

        let target = self.container_ref(&key)?.backstack().push(instance.clone());
        self.transition_container(&key, target, instruction)
    }

    fn dispatch_close(
        &mut self,
        instruction: &NavigationInstruction,
        id: &InstanceId,
        payload: Option<&ResultPayload>,
    ) -> Result<Dispatch> {
        let Some(key) = self.container_holding(id) else {
            tracing::debug!(instance = %id, "Close of instance on no backstack ignored");
            return Ok(Dispatch::default());
        };

        if let Some(payload) = payload {
            let expected = self
                .find_instance(id)
                .and_then(|instance| instance.descriptor().expected_result_type());
            if let Some(expected) = expected {
                if expected != payload.type_name() {
                    return Err(NavigationError::ResultTypeMismatch {
                        expected: expected.to_string(),
                        found: payload.type_name().to_string(),
                    });
                }
            }
        }

        let target = self.container_ref(&key)?.backstack().close(id);
        self.transition_container(&key, target, instruction)
    }

    /// Container an open from `from` lands in.
    ///
    /// Push walks from the requesting context up through its ancestors;
    /// present only considers the root. Within one context the active
    /// container is tried first.
    fn route(&self, from: ContextId, instance: &DestinationInstance) -> Option<ContainerKey> {
        let candidates = match instance.direction() {
            NavigationDirection::Push => self.contexts.ancestry(from),
            NavigationDirection::Present => self.contexts.root_of(from).into_iter().collect(),
        };
        candidates
            .into_iter()
            .filter_map(|context| self.contexts.get(context))
            .flat_map(|node| node.containers_by_priority())
            .find(|key| {
                self.containers
                    .get(key)
                    .is_some_and(|container| container.accepts(instance))
            })
    }

    /// Run the transition chain for `key` and commit what it decides.
    pub(super) fn transition_container(
        &mut self,
        key: &ContainerKey,
        target: Backstack,
        cause: &NavigationInstruction,
    ) -> Result<Dispatch> {
        let container = self.container_ref(key)?;
        let transition = Transition::between(container.backstack(), &target);
        if transition.is_empty() {
            tracing::trace!(container = %key, cause = cause.name(), "Transition has no changes");
            return Ok(Dispatch::default());
        }
        let local = container.interceptors().to_vec();

        let decision = self
            .interceptors
            .evaluate_transition(&local, key, transition, cause)?;
        match decision {
            TransitionDecision::Commit(transition) => self.commit(key, transition, cause, false),
            TransitionDecision::Cancelled(effect) => self.cancelled(effect),
        }
    }

    /// Commit `target` to `key` without running interceptors or posting
    /// results. Used for initial and restored backstacks.
    pub(super) fn commit_unintercepted(
        &mut self,
        key: &ContainerKey,
        target: Backstack,
        cause: &NavigationInstruction,
    ) -> Result<Dispatch> {
        let container = self.container_ref(key)?;
        let transition = Transition::between(container.backstack(), &target);
        if transition.is_empty() {
            return Ok(Dispatch::default());
        }
        self.commit(key, transition, cause, true)
    }

    fn cancelled(&mut self, effect: Option<SideEffect>) -> Result<Dispatch> {
        let mut dispatch = Dispatch::cancelled();
        if let Some(effect) = effect {
            dispatch.merge(effect.run(self)?);
        }
        Ok(dispatch)
    }

    /// Publish a transition.
    ///
    /// Opened instances get a context, closed instances that left every
    /// backstack lose theirs, and result-tagged instances that closed post
    /// their result. `restoring` skips result posting and empty handling.
    fn commit(
        &mut self,
        key: &ContainerKey,
        transition: Transition,
        cause: &NavigationInstruction,
        restoring: bool,
    ) -> Result<Dispatch> {
        self.check_renderable(&transition)?;
        let container = self
            .containers
            .get_mut(key)
            .ok_or_else(|| NavigationError::UnknownContainer {
                container: key.clone(),
            })?;
        container.set_backstack(transition.target().clone());
        let owner = container.owner();
        let empty_behavior = container.empty_behavior();

        if self.config.log_transitions {
            tracing::debug!(
                container = %key,
                cause = cause.name(),
                opened = transition.opened().len(),
                closed = transition.closed().len(),
                updated = transition.updated().len(),
                active = ?transition.target_active().map(DestinationInstance::id),
                "Committed transition"
            );
        } else {
            tracing::trace!(
                container = %key,
                cause = cause.name(),
                opened = transition.opened().len(),
                closed = transition.closed().len(),
                "Committed transition"
            );
        }

        for instance in transition.opened() {
            match self.contexts.by_instance(instance.id()) {
                Some(context) => self.contexts.relocate(context, key.clone(), owner),
                None => {
                    self.contexts
                        .insert_destination(instance.id().clone(), key.clone(), owner);
                }
            }
        }

        // Instances moved to another container keep their context.
        let departed: Vec<&DestinationInstance> = transition
            .closed()
            .iter()
            .filter(|instance| self.find_instance(instance.id()).is_none())
            .collect();

        if !restoring {
            for instance in &departed {
                let Some(channel) = instance.metadata().get(&RESULT_CHANNEL) else {
                    continue;
                };
                if self.contexts.by_instance(&channel.owner).is_none() {
                    tracing::debug!(channel = %channel, "Dropping result for torn-down owner");
                    continue;
                }
                let outcome = match cause {
                    NavigationInstruction::CloseWithResult { id, payload }
                        if id == instance.id() =>
                    {
                        PendingOutcome::Result {
                            payload: payload.clone(),
                        }
                    }
                    _ => PendingOutcome::Closed,
                };
                self.results.post(PendingResult { channel, outcome });
            }
        }

        let departed: Vec<InstanceId> = departed
            .into_iter()
            .map(|instance| instance.id().clone())
            .collect();
        for id in &departed {
            if let Some(context) = self.contexts.by_instance(id) {
                self.destroy_context(context);
            }
        }

        for plugin in &mut self.plugins {
            for instance in transition.closed() {
                plugin.on_closed(key, instance);
            }
            for instance in transition.opened() {
                plugin.on_opened(key, instance);
            }
            if transition.active_changed() {
                plugin.on_active(key, transition.target_active());
            }
        }

        let emptied = transition.target().is_empty() && !transition.previous().is_empty();
        let mut dispatch = Dispatch::committed(key.clone(), transition);

        if !restoring && emptied && empty_behavior == EmptyBehavior::CloseParent {
            let parent = self
                .contexts
                .get(owner)
                .filter(|node| !node.is_root())
                .map(|node| node.instance_id().clone());
            if let Some(parent) = parent {
                tracing::debug!(
                    container = %key,
                    parent = %parent,
                    "Container emptied, closing its host"
                );
                let closed = self.dispatch_with_redirects(NavigationInstruction::close(parent), 0)?;
                dispatch.merge(closed);
            }
        }
        Ok(dispatch)
    }

    /// Every opened instance needs a screen binding and must support the
    /// direction it was opened with, however it reached the backstack.
    fn check_renderable(&self, transition: &Transition) -> Result<()> {
        for instance in transition.opened() {
            let descriptor = instance.descriptor();
            if self.bindings.require(descriptor.id())?.is_synthetic() {
                return Err(NavigationError::NotRenderable {
                    descriptor: descriptor.id().clone(),
                });
            }
            if !descriptor.supports(instance.direction()) {
                return Err(NavigationError::UnsupportedDirection {
                    descriptor: descriptor.id().clone(),
                    direction: instance.direction(),
                });
            }
        }
        Ok(())
    }

    /// Remove a context and everything nested under it.
    pub(super) fn destroy_context(&mut self, id: ContextId) {
        let Some(node) = self.contexts.remove(id) else {
            return;
        };
        for key in node.containers().registered().to_vec() {
            self.teardown_container(&key);
        }
        self.results.discard_owner(node.instance_id());
        tracing::trace!(context = %id, instance = %node.instance_id(), "Destroyed context");
    }

    /// Remove a container, its flows, and the contexts of its instances.
    pub(super) fn teardown_container(&mut self, key: &ContainerKey) {
        let Some(container) = self.containers.remove(key) else {
            return;
        };

        let bound: Vec<FlowId> = self
            .flows
            .values()
            .filter(|entry| entry.container() == key)
            .map(|entry| entry.id().clone())
            .collect();
        for flow in bound {
            if let Some(mut entry) = self.flows.remove(&flow) {
                entry.cancel();
            }
            tracing::debug!(flow = %flow, container = %key, "Cancelled flow of removed container");
        }

        for instance in container.backstack() {
            let Some(context) = self.contexts.by_instance(instance.id()) else {
                continue;
            };
            let lives_here = self
                .contexts
                .get(context)
                .is_some_and(|node| node.container() == Some(key));
            if lives_here {
                self.destroy_context(context);
            }
        }

        if let Some(owner) = self.contexts.get_mut(container.owner()) {
            owner.containers_mut().unregister(key);
        }
        tracing::debug!(container = %key, "Removed container");
    }
}
