//! Replaying a scenario against a live controller.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use nav_core::{
    BindingRegistry, ContainerConfig, ContainerFilter, ContextId, ContextKind,
    NavigationController, NavigationInstruction, RESULT_CHANNEL, ResultHandler,
};
use nav_model::{
    Backstack, ContainerKey, DescriptorId, DestinationInstance, InstanceId, NavigationDirection,
    PendingOutcome, ResultChannelId,
};
use serde::Serialize;

use crate::scenario::{ContainerSpec, Event, Scenario};

/// A result handed to a channel during replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveredResult {
    /// `owner/name`
    pub channel: String,
    /// `None` when the destination closed without a value.
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerReport {
    pub key: String,
    pub owner: String,
    /// Instance labels, bottom first.
    pub backstack: Vec<String>,
    pub active: Option<String>,
    /// Whether this is the active container of its owner.
    pub selected: bool,
}

/// Final state of a replayed scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub containers: Vec<ContainerReport>,
    pub delivered: Vec<DeliveredResult>,
    pub pending_results: usize,
}

/// Replay every event of `scenario` and report the resulting state.
pub fn replay(scenario: &Scenario) -> Result<ScenarioReport> {
    let mut replay = Replay::new(scenario)?;
    replay.run()?;
    Ok(replay.report())
}

#[derive(Debug, Clone)]
struct ChannelRegistration {
    /// Label of the owning instance; the root when `None`.
    owner: Option<String>,
    name: String,
}

pub struct Replay<'a> {
    scenario: &'a Scenario,
    bindings: BindingRegistry,
    controller: NavigationController,
    root: ContextId,
    labels: BTreeMap<String, InstanceId>,
    names: HashMap<InstanceId, String>,
    opened: HashMap<String, usize>,
    channels: Vec<ChannelRegistration>,
    delivered: Rc<RefCell<Vec<DeliveredResult>>>,
    containers: Vec<ContainerSpec>,
    saved: Option<Vec<u8>>,
}

fn screen_label(instance: &DestinationInstance) -> nav_core::Result<Box<dyn Any>> {
    Ok(Box::new(instance.descriptor().id().to_string()))
}

fn container_filter(spec: &ContainerSpec) -> Result<ContainerFilter> {
    if spec.accepts.is_empty() && spec.directions.is_empty() {
        return Ok(ContainerFilter::AcceptAll);
    }
    let kinds = spec
        .accepts
        .iter()
        .map(|kind| DescriptorId::new(kind.as_str()))
        .collect::<nav_model::Result<BTreeSet<_>>>()?;
    let directions: Vec<NavigationDirection> = spec.directions.clone();
    Ok(ContainerFilter::custom(move |instance| {
        let kind_ok = kinds.is_empty() || kinds.contains(instance.descriptor().id());
        let direction_ok = directions.is_empty() || directions.contains(&instance.direction());
        kind_ok && direction_ok
    }))
}

impl<'a> Replay<'a> {
    pub fn new(scenario: &'a Scenario) -> Result<Self> {
        let mut bindings = BindingRegistry::new();
        for spec in &scenario.destinations {
            bindings.register_screen(DescriptorId::new(spec.kind.as_str())?, screen_label)?;
        }
        let mut controller =
            NavigationController::new(scenario.config.clone(), bindings.clone());
        let root = controller.register_root(scenario.root.clone());

        let mut replay = Self {
            scenario,
            bindings,
            controller,
            root,
            labels: BTreeMap::new(),
            names: HashMap::new(),
            opened: HashMap::new(),
            channels: Vec::new(),
            delivered: Rc::new(RefCell::new(Vec::new())),
            containers: Vec::new(),
            saved: None,
        };
        for spec in &scenario.containers {
            replay
                .create_container(spec, true)
                .with_context(|| format!("create container '{}'", spec.key))?;
        }
        Ok(replay)
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn run(&mut self) -> Result<()> {
        let scenario = self.scenario;
        for (index, event) in scenario.events.iter().enumerate() {
            let _span = tracing::info_span!("event", index = index + 1, kind = event.name())
                .entered();
            self.apply(event)
                .with_context(|| format!("event {} ({})", index + 1, event.name()))?;

            // Containers torn down with their host are not recreated on restore.
            let controller = &self.controller;
            self.containers.retain(|spec| {
                ContainerKey::new(spec.key.as_str())
                    .is_ok_and(|key| controller.container(&key).is_some())
            });
        }
        tracing::info!(events = scenario.events.len(), "Scenario replayed");
        Ok(())
    }

    pub fn apply(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::Open {
                kind,
                from,
                direction,
                payload,
                label,
            } => self.open(
                kind,
                from.as_deref(),
                *direction,
                payload,
                label.as_deref(),
                None,
            ),
            Event::OpenForResult {
                kind,
                from,
                channel,
                direction,
                payload,
                label,
            } => self.open(
                kind,
                from.as_deref(),
                *direction,
                payload,
                label.as_deref(),
                Some(channel.as_str()),
            ),
            Event::Close {
                instance,
                container,
            } => self.close(instance.as_deref(), container.as_deref(), None),
            Event::CloseWithResult {
                instance,
                container,
                value,
            } => self.close(instance.as_deref(), container.as_deref(), Some(value)),
            Event::Visibility { container, visible } => {
                let key = ContainerKey::new(container.as_str())?;
                self.controller.set_container_visibility(&key, *visible)?;
                Ok(())
            }
            Event::Select { container } => {
                let key = ContainerKey::new(container.as_str())?;
                self.controller.select_container(&key)?;
                Ok(())
            }
            Event::CreateContainer(spec) => self.create_container(spec, true),
            Event::RemoveContainer { container } => {
                let key = ContainerKey::new(container.as_str())?;
                self.controller.remove_container(&key)?;
                Ok(())
            }
            Event::Snapshot => {
                let bytes = self.controller.encode_state()?;
                tracing::info!(bytes = bytes.len(), "Saved navigation state");
                self.saved = Some(bytes);
                Ok(())
            }
            Event::Restore => self.restore(),
        }
    }

    fn open(
        &mut self,
        kind: &str,
        from: Option<&str>,
        direction: Option<NavigationDirection>,
        payload: &serde_json::Value,
        label: Option<&str>,
        channel: Option<&str>,
    ) -> Result<()> {
        let scenario = self.scenario;
        let spec = scenario
            .destination(kind)
            .with_context(|| format!("unknown destination '{kind}'"))?;
        let from_context = self.context_for(from)?;
        let direction = direction.unwrap_or_else(|| spec.preferred_direction());

        let mut instance = DestinationInstance::new(spec.descriptor(payload.clone())?, direction);
        if let Some(name) = channel {
            let channel = self.ensure_channel(from, from_context, name)?;
            instance = instance.with_metadata(&RESULT_CHANNEL, channel)?;
        }
        let id = instance.id().clone();
        let label = self.next_label(kind, label)?;

        let dispatch = self
            .controller
            .dispatch(NavigationInstruction::open(from_context, instance))?;
        if self.controller.context_of(&id).is_some() {
            tracing::info!(instance = %label, descriptor = kind, "Opened");
            self.remember(label, id);
        } else {
            tracing::info!(
                descriptor = kind,
                cancelled = dispatch.was_cancelled(),
                "Open did not add an instance"
            );
        }
        Ok(())
    }

    fn close(
        &mut self,
        instance: Option<&str>,
        container: Option<&str>,
        value: Option<&serde_json::Value>,
    ) -> Result<()> {
        let id = self.target(instance, container)?;
        let instruction = match value {
            Some(value) => NavigationInstruction::close_with_result(id, value)?,
            None => NavigationInstruction::close(id),
        };
        self.controller.dispatch(instruction)?;
        Ok(())
    }

    fn create_container(&mut self, spec: &ContainerSpec, fresh: bool) -> Result<()> {
        let key = spec.container_key()?;
        let owner = self.context_for(spec.owner.as_deref())?;
        let mut config = ContainerConfig::new(key.clone()).filter(container_filter(spec)?);
        if let Some(behavior) = spec.empty_behavior {
            config = config.empty_behavior(behavior);
        }

        let mut initial = Vec::new();
        if fresh {
            let scenario = self.scenario;
            for kind in &spec.initial {
                let destination = scenario
                    .destination(kind)
                    .with_context(|| format!("unknown destination '{kind}'"))?;
                let instance = DestinationInstance::new(
                    destination.descriptor(serde_json::Value::Null)?,
                    destination.preferred_direction(),
                );
                let label = self.next_label(kind, None)?;
                self.remember(label, instance.id().clone());
                initial.push(instance);
            }
        }
        config = config.initial_backstack(Backstack::from_instances(initial));

        self.controller.create_container(owner, config)?;
        if spec.visible {
            self.controller.set_container_visibility(&key, true)?;
        }
        if fresh {
            self.containers.push(spec.clone());
        }
        Ok(())
    }

    /// Replace the controller with one rebuilt from the last snapshot.
    fn restore(&mut self) -> Result<()> {
        let bytes = self.saved.clone().context("no snapshot to restore")?;
        let mut controller =
            NavigationController::new(self.scenario.config.clone(), self.bindings.clone());
        let root = controller.register_root(self.scenario.root.clone());
        controller.restore_encoded(&bytes)?;
        self.controller = controller;
        self.root = root;

        let containers = std::mem::take(&mut self.containers);
        for spec in &containers {
            if self.context_for(spec.owner.as_deref()).is_err() {
                tracing::warn!(container = %spec.key, "Host of container is gone after restore");
                continue;
            }
            self.create_container(spec, false)
                .with_context(|| format!("recreate container '{}'", spec.key))?;
        }
        self.containers = containers;

        let channels = std::mem::take(&mut self.channels);
        for registration in channels {
            let Ok(owner) = self.context_for(registration.owner.as_deref()) else {
                tracing::debug!(
                    channel = %registration.name,
                    "Channel owner is gone after restore"
                );
                continue;
            };
            let handler = self.handler(&registration);
            self.controller
                .register_result_channel(owner, registration.name.clone(), handler)?;
            self.channels.push(registration);
        }
        tracing::info!(
            containers = self.containers.len(),
            pending_results = self.controller.pending_results().len(),
            "Restored navigation state"
        );
        Ok(())
    }

    /// Channel `name` on `owner`, registered on first use.
    fn ensure_channel(
        &mut self,
        owner: Option<&str>,
        context: ContextId,
        name: &str,
    ) -> Result<ResultChannelId> {
        let known = self.channels.iter().any(|registration| {
            registration.owner.as_deref() == owner && registration.name == name
        });
        if known {
            let node = self
                .controller
                .context(context)
                .context("channel owner has no context")?;
            return Ok(ResultChannelId::new(node.instance_id().clone(), name));
        }
        let registration = ChannelRegistration {
            owner: owner.map(str::to_string),
            name: name.to_string(),
        };
        let handler = self.handler(&registration);
        let channel = self
            .controller
            .register_result_channel(context, name, handler)?;
        self.channels.push(registration);
        Ok(channel)
    }

    fn handler(&self, registration: &ChannelRegistration) -> ResultHandler {
        let sink = Rc::clone(&self.delivered);
        let owner = registration.owner.as_deref().unwrap_or(&self.scenario.root);
        let channel = format!("{owner}/{}", registration.name);
        Box::new(move |outcome: PendingOutcome| -> nav_core::Result<()> {
            let value = match outcome {
                PendingOutcome::Closed => None,
                PendingOutcome::Result { payload } => Some(payload.value().clone()),
            };
            tracing::info!(channel = %channel, closed = value.is_none(), "Result delivered");
            sink.borrow_mut().push(DeliveredResult {
                channel: channel.clone(),
                value,
            });
            Ok(())
        })
    }

    fn context_for(&self, label: Option<&str>) -> Result<ContextId> {
        let Some(label) = label else {
            return Ok(self.root);
        };
        let id = self
            .labels
            .get(label)
            .with_context(|| format!("unknown instance '{label}'"))?;
        self.controller
            .context_of(id)
            .with_context(|| format!("instance '{label}' is not on any backstack"))
    }

    fn target(&self, instance: Option<&str>, container: Option<&str>) -> Result<InstanceId> {
        match (instance, container) {
            (Some(label), None) => self
                .labels
                .get(label)
                .cloned()
                .with_context(|| format!("unknown instance '{label}'")),
            (None, Some(container)) => {
                let key = ContainerKey::new(container)?;
                let active = self
                    .controller
                    .active_instance(&key)
                    .with_context(|| format!("container '{container}' has no active instance"))?;
                Ok(active.id().clone())
            }
            _ => bail!("name exactly one of instance or container"),
        }
    }

    fn next_label(&mut self, kind: &str, explicit: Option<&str>) -> Result<String> {
        if let Some(label) = explicit {
            if self.labels.contains_key(label) {
                bail!("label '{label}' is already in use");
            }
            return Ok(label.to_string());
        }
        let count = self.opened.entry(kind.to_string()).or_insert(0);
        loop {
            *count += 1;
            let label = if *count == 1 {
                kind.to_string()
            } else {
                format!("{kind}-{count}")
            };
            if !self.labels.contains_key(&label) {
                return Ok(label);
            }
        }
    }

    fn remember(&mut self, label: String, id: InstanceId) {
        self.names.insert(id.clone(), label.clone());
        self.labels.insert(label, id);
    }

    fn name_of(&self, id: &InstanceId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn report(&self) -> ScenarioReport {
        let containers = self
            .controller
            .containers()
            .map(|container| {
                let owner = self
                    .controller
                    .context(container.owner())
                    .map_or_else(String::new, |node| match node.kind() {
                        ContextKind::Root { name } => name.clone(),
                        ContextKind::Destination { .. } => self.name_of(node.instance_id()),
                    });
                ContainerReport {
                    key: container.key().to_string(),
                    owner,
                    backstack: container
                        .backstack()
                        .iter()
                        .map(|instance| self.name_of(instance.id()))
                        .collect(),
                    active: container.active().map(|instance| self.name_of(instance.id())),
                    selected: self.controller.active_container(container.owner())
                        == Some(container.key()),
                }
            })
            .collect();
        ScenarioReport {
            containers,
            delivered: self.delivered.borrow().clone(),
            pending_results: self.controller.pending_results().len(),
        }
    }
}
