//! The navigation controller.
//!
//! One [`NavigationController`] owns every root, container, context, result
//! channel, and flow of an application. It is the explicit context object
//! the host threads through its navigation code; there is no global
//! registry.
//!
//! The controller's methods are split by concern:
//!
//! - `mod.rs`: construction, roots, containers, visibility, rendering
//! - `dispatch.rs`: instruction handling, routing, commits, teardown
//! - `results.rs`: result channels and delivery
//! - `flows.rs`: flow registration and step handling
//! - `snapshot.rs`: saving and restoring state

mod dispatch;
mod flows;
mod results;
mod snapshot;

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use crossbeam_channel::{Receiver, Sender};
use nav_model::{Backstack, ContainerKey, DestinationInstance, FlowId, InstanceId};
use nav_persistence::NavigationSnapshot;

use crate::active::ActiveChildTracker;
use crate::binding::{Binding, BindingRegistry};
use crate::config::NavigationConfig;
use crate::container::{Container, ContainerConfig};
use crate::context::{ContextArena, ContextId, ContextNode};
use crate::dispatch::Dispatch;
use crate::error::{NavigationError, Result};
use crate::flow::{FlowEntry, FlowStepInterceptor};
use crate::instruction::{NavigationCommand, NavigationInstruction};
use crate::interceptor::{
    BuiltInterceptor, InterceptorPipeline, OpenInterceptor, TransitionInterceptor,
};
use crate::plugin::NavigationPlugin;
use crate::result::ResultManager;
use crate::sender::NavigationSender;

/// Single-threaded navigation state machine.
pub struct NavigationController {
    config: NavigationConfig,
    bindings: BindingRegistry,
    contexts: ContextArena,
    containers: BTreeMap<ContainerKey, Container>,
    roots: ActiveChildTracker<ContextId>,
    interceptors: InterceptorPipeline,
    plugins: Vec<Box<dyn NavigationPlugin>>,
    results: ResultManager,
    flows: BTreeMap<FlowId, FlowEntry>,
    /// Restored state not yet claimed by a container or flow.
    restored: NavigationSnapshot,
    commands: Receiver<NavigationCommand>,
    command_sender: Sender<NavigationCommand>,
}

impl NavigationController {
    pub fn new(config: NavigationConfig, bindings: BindingRegistry) -> Self {
        let (command_sender, commands) = crossbeam_channel::unbounded();
        let mut interceptors = InterceptorPipeline::new();
        interceptors.add_transition(Rc::new(FlowStepInterceptor));

        tracing::debug!(
            strict_mode = config.strict_mode,
            max_redirect_depth = config.max_redirect_depth,
            bindings = bindings.len(),
            "Created navigation controller"
        );
        Self {
            config,
            bindings,
            contexts: ContextArena::new(),
            containers: BTreeMap::new(),
            roots: ActiveChildTracker::new(),
            interceptors,
            plugins: Vec::new(),
            results: ResultManager::new(),
            flows: BTreeMap::new(),
            restored: NavigationSnapshot::new(),
            commands,
            command_sender,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    // =========================================================================
    // INTERCEPTORS AND PLUGINS
    // =========================================================================

    pub fn add_open_interceptor(&mut self, interceptor: Rc<dyn OpenInterceptor>) {
        self.interceptors.add_open(interceptor);
    }

    /// Add a global transition interceptor. Global interceptors run before
    /// container-local ones, in registration order.
    pub fn add_transition_interceptor(&mut self, interceptor: Rc<dyn TransitionInterceptor>) {
        self.interceptors.add_transition(interceptor);
    }

    /// Register a built interceptor with every family it has hooks for.
    pub fn add_interceptor(&mut self, interceptor: BuiltInterceptor) {
        let has_open = interceptor.has_open_hooks();
        let has_transition = interceptor.has_transition_hooks();
        let shared = Rc::new(interceptor);
        if has_open {
            self.interceptors.add_open(shared.clone());
        }
        if has_transition {
            self.interceptors.add_transition(shared);
        }
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn NavigationPlugin>) {
        tracing::debug!(plugin = plugin.name(), "Added navigation plugin");
        self.plugins.push(plugin);
    }

    /// Handle for posting commands from other threads.
    pub fn sender(&self) -> NavigationSender {
        NavigationSender::new(self.command_sender.clone())
    }

    /// Apply every command posted through a [`NavigationSender`], in order.
    /// Stops at the first failing command.
    pub fn process_pending(&mut self) -> Result<Dispatch> {
        let mut dispatch = Dispatch::default();
        while let Ok(command) = self.commands.try_recv() {
            match command {
                NavigationCommand::Instruction(instruction) => {
                    dispatch.merge(self.dispatch(instruction)?);
                }
                NavigationCommand::ContainerVisibility { container, visible } => {
                    self.set_container_visibility(&container, visible)?;
                }
                NavigationCommand::SelectContainer { container } => {
                    self.select_container(&container)?;
                }
            }
        }
        Ok(dispatch)
    }

    // =========================================================================
    // ROOTS
    // =========================================================================

    /// Register a top-level navigation root.
    pub fn register_root(&mut self, name: impl Into<String>) -> ContextId {
        let name = name.into();
        let id = self.contexts.insert_root(name.clone());
        self.roots.register(id);
        tracing::debug!(root = %id, name, "Registered navigation root");
        id
    }

    /// Tear down a root with everything nested under it.
    pub fn unregister_root(&mut self, root: ContextId) -> Result<()> {
        let is_root = self
            .contexts
            .get(root)
            .is_some_and(ContextNode::is_root);
        if !is_root {
            return Err(NavigationError::UnknownContext { context: root });
        }
        self.destroy_context(root);
        self.roots.unregister(&root);
        tracing::debug!(root = %root, "Unregistered navigation root");
        Ok(())
    }

    pub fn roots(&self) -> &[ContextId] {
        self.roots.registered()
    }

    pub fn active_root(&self) -> Option<ContextId> {
        self.roots.active().copied()
    }

    pub fn set_root_visibility(&mut self, root: ContextId, visible: bool) {
        self.roots.set_visibility(&root, visible);
    }

    pub fn select_root(&mut self, root: ContextId) {
        self.roots.set_active(&root);
    }

    // =========================================================================
    // CONTAINERS
    // =========================================================================

    /// Create a container hosted by `owner`.
    ///
    /// Restored state for the container's key takes precedence over the
    /// configured initial backstack. The initial backstack is committed
    /// without running interceptors.
    pub fn create_container(
        &mut self,
        owner: ContextId,
        config: ContainerConfig,
    ) -> Result<Dispatch> {
        if !self.contexts.contains(owner) {
            return Err(NavigationError::UnknownContext { context: owner });
        }
        let key = config.key().clone();
        if self.containers.contains_key(&key) {
            return Err(NavigationError::DuplicateContainer { container: key });
        }

        let initial = match self.restored.containers.remove(&key) {
            Some(saved) => {
                tracing::debug!(container = %key, "Restoring saved backstack");
                saved.to_backstack()
            }
            None => config.initial.clone(),
        };
        let container = Container::new(config, owner, self.config.default_empty_behavior);
        self.containers.insert(key.clone(), container);
        if let Some(node) = self.contexts.get_mut(owner) {
            node.containers_mut().register(key.clone());
        }
        tracing::debug!(container = %key, owner = %owner, "Created container");

        let cause = NavigationInstruction::set_backstack(key.clone(), initial.clone());
        let dispatch = match self.commit_unintercepted(&key, initial, &cause) {
            Ok(dispatch) => dispatch,
            Err(error) => {
                self.teardown_container(&key);
                return Err(error);
            }
        };
        self.flush_results()?;
        Ok(dispatch)
    }

    /// Remove a container, tearing down every context inside it.
    pub fn remove_container(&mut self, key: &ContainerKey) -> Result<()> {
        if !self.containers.contains_key(key) {
            return Err(NavigationError::UnknownContainer {
                container: key.clone(),
            });
        }
        self.teardown_container(key);
        Ok(())
    }

    pub fn container(&self, key: &ContainerKey) -> Option<&Container> {
        self.containers.get(key)
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }

    pub fn backstack(&self, key: &ContainerKey) -> Option<&Backstack> {
        self.containers.get(key).map(Container::backstack)
    }

    /// Instance the renderer should show for `key`.
    pub fn active_instance(&self, key: &ContainerKey) -> Option<&DestinationInstance> {
        self.containers.get(key).and_then(Container::active)
    }

    /// Active child container of `owner`.
    pub fn active_container(&self, owner: ContextId) -> Option<&ContainerKey> {
        self.contexts
            .get(owner)
            .and_then(|node| node.containers().active())
    }

    pub fn set_container_visibility(&mut self, key: &ContainerKey, visible: bool) -> Result<()> {
        let owner = self.container_ref(key)?.owner();
        if let Some(node) = self.contexts.get_mut(owner) {
            node.containers_mut().set_visibility(key, visible);
        }
        Ok(())
    }

    /// Apply visibility reports for several children of `owner` together.
    pub fn set_container_visibilities(
        &mut self,
        owner: ContextId,
        changes: &[(ContainerKey, bool)],
    ) -> Result<()> {
        let node = self
            .contexts
            .get_mut(owner)
            .ok_or(NavigationError::UnknownContext { context: owner })?;
        node.containers_mut()
            .set_visibilities(changes.iter().map(|(key, visible)| (key, *visible)));
        Ok(())
    }

    /// Explicitly make `key` the active container of its owner.
    pub fn select_container(&mut self, key: &ContainerKey) -> Result<()> {
        let owner = self.container_ref(key)?.owner();
        if let Some(node) = self.contexts.get_mut(owner) {
            node.containers_mut().set_active(key);
        }
        Ok(())
    }

    // =========================================================================
    // CONTEXTS
    // =========================================================================

    pub fn context(&self, id: ContextId) -> Option<&ContextNode> {
        self.contexts.get(id)
    }

    /// Context of an instance on some backstack.
    pub fn context_of(&self, instance: &InstanceId) -> Option<ContextId> {
        self.contexts.by_instance(instance)
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Build the host-side object for an instance through its screen binding.
    ///
    /// Returns `None` when the instance is on no backstack.
    pub fn create_destination(&self, instance: &InstanceId) -> Result<Option<Box<dyn Any>>> {
        let Some(instance) = self.find_instance(instance) else {
            return Ok(None);
        };
        let descriptor = instance.descriptor().id();
        match self.bindings.require(descriptor)? {
            Binding::Screen(factory) => factory.create(instance).map(Some),
            Binding::Synthetic(_) => Err(NavigationError::NotRenderable {
                descriptor: descriptor.clone(),
            }),
        }
    }

    fn container_ref(&self, key: &ContainerKey) -> Result<&Container> {
        self.containers
            .get(key)
            .ok_or_else(|| NavigationError::UnknownContainer {
                container: key.clone(),
            })
    }

    fn find_instance(&self, id: &InstanceId) -> Option<&DestinationInstance> {
        self.containers
            .values()
            .find_map(|container| container.backstack().get(id))
    }

    fn container_holding(&self, id: &InstanceId) -> Option<ContainerKey> {
        self.containers
            .values()
            .find(|container| container.backstack().contains(id))
            .map(|container| container.key().clone())
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("config", &self.config)
            .field("containers", &self.containers)
            .field("roots", &self.roots)
            .field("results", &self.results)
            .field("flows", &self.flows.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
