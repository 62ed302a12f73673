//! Result channels and typed navigation helpers.

use std::collections::BTreeMap;

use nav_model::{
    ContainerKey, Descriptor, Destination, DestinationInstance, InstanceId, NavigationDirection,
    PendingOutcome, PendingResult, ResultChannelId, WithResult,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::NavigationController;
use crate::container::Container;
use crate::context::{ContextArena, ContextId};
use crate::dispatch::Dispatch;
use crate::error::{NavigationError, Result};
use crate::instruction::NavigationInstruction;
use crate::result::{
    NavigationResult, RESULT_CHANNEL, ResultChannel, ResultHandler, typed_handler,
};

impl NavigationController {
    // =========================================================================
    // CHANNELS
    // =========================================================================

    /// Attach a result channel owned by the destination (or root) of `owner`.
    ///
    /// Results already queued for the channel are delivered as soon as the
    /// owner is active, which may be immediately.
    pub fn register_result_channel(
        &mut self,
        owner: ContextId,
        result_id: impl Into<String>,
        handler: ResultHandler,
    ) -> Result<ResultChannelId> {
        let node = self
            .contexts
            .get(owner)
            .ok_or(NavigationError::UnknownContext { context: owner })?;
        let channel = ResultChannelId::new(node.instance_id().clone(), result_id);
        self.results.register(channel.clone(), handler)?;
        tracing::debug!(channel = %channel, "Registered result channel");
        self.flush_results()?;
        Ok(channel)
    }

    /// Attach a typed result channel.
    pub fn result_channel<T, F>(
        &mut self,
        owner: ContextId,
        result_id: impl Into<String>,
        handler: F,
    ) -> Result<ResultChannel<T>>
    where
        T: DeserializeOwned + 'static,
        F: FnMut(NavigationResult<T>) + 'static,
    {
        self.register_result_channel(owner, result_id, typed_handler(handler))
            .map(ResultChannel::new)
    }

    /// Detach a channel. Results queued for it stay queued.
    pub fn unregister_result_channel(&mut self, channel: &ResultChannelId) -> bool {
        self.results.unregister(channel)
    }

    /// Results produced but not yet delivered.
    pub fn pending_results(&self) -> &[PendingResult] {
        self.results.pending()
    }

    /// Queue `outcome` for the channel `instance` reports to. Instances
    /// opened without a channel are ignored.
    pub(crate) fn post_result_for(&mut self, instance: &InstanceId, outcome: PendingOutcome) {
        let channel = self
            .find_instance(instance)
            .and_then(|instance| instance.metadata().get(&RESULT_CHANNEL));
        match channel {
            Some(channel) => self.results.post(PendingResult { channel, outcome }),
            None => {
                tracing::debug!(instance = %instance, "Instance reports to no result channel");
            }
        }
    }

    /// Deliver every queued result whose channel is attached and whose owner
    /// is active.
    pub(super) fn flush_results(&mut self) -> Result<()> {
        while let Some(result) = self
            .results
            .take_deliverable(|owner| owner_is_active(&self.contexts, &self.containers, owner))
        {
            self.results.deliver(result)?;
        }
        Ok(())
    }

    // =========================================================================
    // TYPED NAVIGATION
    // =========================================================================

    /// Open a typed destination in its preferred direction.
    pub fn open<D: Destination>(&mut self, from: ContextId, destination: &D) -> Result<Dispatch> {
        self.open_in(from, destination, D::preferred_direction())
    }

    pub fn push<D: Destination>(&mut self, from: ContextId, destination: &D) -> Result<Dispatch> {
        self.open_in(from, destination, NavigationDirection::Push)
    }

    pub fn present<D: Destination>(
        &mut self,
        from: ContextId,
        destination: &D,
    ) -> Result<Dispatch> {
        self.open_in(from, destination, NavigationDirection::Present)
    }

    fn open_in<D: Destination>(
        &mut self,
        from: ContextId,
        destination: &D,
        direction: NavigationDirection,
    ) -> Result<Dispatch> {
        let instance = DestinationInstance::new(Descriptor::of(destination)?, direction);
        self.dispatch(NavigationInstruction::open(from, instance))
    }

    /// Open a destination whose result is delivered to `channel`.
    pub fn open_for_result<D: WithResult>(
        &mut self,
        from: ContextId,
        channel: &ResultChannel<D::Output>,
        destination: &D,
    ) -> Result<Dispatch> {
        let descriptor = Descriptor::of_with_result(destination)?;
        self.open_erased_for_result(from, channel.id(), descriptor, D::preferred_direction())
    }

    /// Untyped form of [`open_for_result`](Self::open_for_result).
    pub fn open_erased_for_result(
        &mut self,
        from: ContextId,
        channel: &ResultChannelId,
        descriptor: Descriptor,
        direction: NavigationDirection,
    ) -> Result<Dispatch> {
        let instance = DestinationInstance::new(descriptor, direction)
            .with_metadata(&RESULT_CHANNEL, channel.clone())?;
        self.dispatch(NavigationInstruction::open(from, instance))
    }

    pub fn close(&mut self, id: &InstanceId) -> Result<Dispatch> {
        self.dispatch(NavigationInstruction::close(id.clone()))
    }

    /// Close `id`, handing `value` to the channel it reports to.
    pub fn close_with_result<T: Serialize>(
        &mut self,
        id: &InstanceId,
        value: &T,
    ) -> Result<Dispatch> {
        self.dispatch(NavigationInstruction::close_with_result(id.clone(), value)?)
    }
}

/// Whether the owner of a result channel can receive now. Roots always can;
/// a destination can once it is the top of its container's backstack.
fn owner_is_active(
    contexts: &ContextArena,
    containers: &BTreeMap<ContainerKey, Container>,
    owner: &InstanceId,
) -> bool {
    let Some(node) = contexts.by_instance(owner).and_then(|id| contexts.get(id)) else {
        return false;
    };
    match node.container() {
        None => true,
        Some(key) => containers
            .get(key)
            .and_then(Container::active)
            .is_some_and(|active| active.id() == owner),
    }
}
