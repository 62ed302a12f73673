//! Scenario files replayed by `navctl`.
//!
//! A scenario declares destination kinds, the containers hosted by the root,
//! and a list of events:
//!
//! ```toml
//! root = "app"
//!
//! [config]
//! strict_mode = true
//!
//! [[destination]]
//! kind = "home"
//!
//! [[destination]]
//! kind = "picker"
//! returns_result = true
//!
//! [[container]]
//! key = "main"
//! initial = ["home"]
//!
//! [[event]]
//! type = "open_for_result"
//! kind = "picker"
//! from = "home"
//! channel = "color"
//!
//! [[event]]
//! type = "close_with_result"
//! container = "main"
//! value = "blue"
//! ```
//!
//! Instances are referred to by label. An event may name the label of the
//! instance it opens; otherwise the label is the destination kind, suffixed
//! with `-2`, `-3`, ... when the kind was opened before.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use nav_core::{EmptyBehavior, NavigationConfig};
use nav_model::{
    Capabilities, ContainerKey, Descriptor, DescriptorId, NavigationDirection, result_type_name,
};
use serde::Deserialize;

fn default_root() -> String {
    "app".to_string()
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: NavigationConfig,
    /// Name of the navigation root.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default, rename = "destination")]
    pub destinations: Vec<DestinationSpec>,
    /// Containers created on the root before the first event.
    #[serde(default, rename = "container")]
    pub containers: Vec<ContainerSpec>,
    #[serde(default, rename = "event")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationSpec {
    pub kind: String,
    #[serde(default = "yes")]
    pub push: bool,
    #[serde(default)]
    pub present: bool,
    /// Whether the destination closes with a value.
    #[serde(default)]
    pub returns_result: bool,
}

impl DestinationSpec {
    pub fn descriptor(&self, payload: serde_json::Value) -> Result<Descriptor> {
        let id = DescriptorId::new(self.kind.as_str())?;
        let capabilities = Capabilities {
            push: self.push,
            present: self.present,
            result_type: self
                .returns_result
                .then(|| result_type_name::<serde_json::Value>().to_string()),
        };
        Ok(Descriptor::new(id, capabilities, payload))
    }

    pub fn preferred_direction(&self) -> NavigationDirection {
        if self.push {
            NavigationDirection::Push
        } else {
            NavigationDirection::Present
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSpec {
    pub key: String,
    /// Label of the hosting instance; the root when absent.
    #[serde(default)]
    pub owner: Option<String>,
    /// Destination kinds routed here. Empty accepts every kind.
    #[serde(default)]
    pub accepts: Vec<String>,
    /// Directions routed here. Empty accepts both.
    #[serde(default)]
    pub directions: Vec<NavigationDirection>,
    #[serde(default)]
    pub empty_behavior: Option<EmptyBehavior>,
    /// Kinds that form the initial backstack, bottom first.
    #[serde(default)]
    pub initial: Vec<String>,
    #[serde(default)]
    pub visible: bool,
}

impl ContainerSpec {
    pub fn container_key(&self) -> Result<ContainerKey> {
        Ok(ContainerKey::new(self.key.as_str())?)
    }
}

/// One replayed step. Instances are named by label; `container` targets pick
/// the container's active instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Open {
        kind: String,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        direction: Option<NavigationDirection>,
        #[serde(default)]
        payload: serde_json::Value,
        #[serde(default)]
        label: Option<String>,
    },
    OpenForResult {
        kind: String,
        #[serde(default)]
        from: Option<String>,
        /// Channel name, registered on the `from` context on first use.
        channel: String,
        #[serde(default)]
        direction: Option<NavigationDirection>,
        #[serde(default)]
        payload: serde_json::Value,
        #[serde(default)]
        label: Option<String>,
    },
    Close {
        #[serde(default)]
        instance: Option<String>,
        #[serde(default)]
        container: Option<String>,
    },
    CloseWithResult {
        #[serde(default)]
        instance: Option<String>,
        #[serde(default)]
        container: Option<String>,
        value: serde_json::Value,
    },
    Visibility {
        container: String,
        visible: bool,
    },
    Select {
        container: String,
    },
    CreateContainer(ContainerSpec),
    RemoveContainer {
        container: String,
    },
    /// Keep the encoded state in memory.
    Snapshot,
    /// Rebuild the controller from the last snapshot, as after process death.
    Restore,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::OpenForResult { .. } => "open_for_result",
            Self::Close { .. } => "close",
            Self::CloseWithResult { .. } => "close_with_result",
            Self::Visibility { .. } => "visibility",
            Self::Select { .. } => "select",
            Self::CreateContainer(_) => "create_container",
            Self::RemoveContainer { .. } => "remove_container",
            Self::Snapshot => "snapshot",
            Self::Restore => "restore",
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read scenario {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse scenario {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn destination(&self, kind: &str) -> Option<&DestinationSpec> {
        self.destinations.iter().find(|spec| spec.kind == kind)
    }

    /// Everything wrong with the scenario that can be seen without replaying
    /// it, in file order.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut kinds = BTreeSet::new();
        for spec in &self.destinations {
            if spec.kind.trim().is_empty() {
                problems.push("destination with an empty kind".to_string());
            } else if !kinds.insert(spec.kind.as_str()) {
                problems.push(format!("destination '{}' is declared twice", spec.kind));
            }
            if !spec.push && !spec.present {
                problems.push(format!("destination '{}' supports no direction", spec.kind));
            }
        }

        let mut keys = BTreeSet::new();
        for spec in &self.containers {
            if spec.owner.is_some() {
                problems.push(format!(
                    "container '{}' names an owner; create it with a create_container event",
                    spec.key
                ));
            }
            self.container_problems(spec, &mut keys, &mut problems);
        }

        let mut snapshot_taken = false;
        for (index, event) in self.events.iter().enumerate() {
            let at = format!("event {} ({})", index + 1, event.name());
            match event {
                Event::Open { kind, .. } => self.require_kind(&at, kind, &mut problems),
                Event::OpenForResult { kind, .. } => {
                    self.require_kind(&at, kind, &mut problems);
                    if self.destination(kind).is_some_and(|spec| !spec.returns_result) {
                        problems.push(format!("{at}: '{kind}' does not return a result"));
                    }
                }
                Event::Close {
                    instance,
                    container,
                }
                | Event::CloseWithResult {
                    instance,
                    container,
                    ..
                } => {
                    if instance.is_some() == container.is_some() {
                        problems.push(format!("{at}: name exactly one of instance or container"));
                    }
                }
                Event::CreateContainer(spec) => {
                    self.container_problems(spec, &mut keys, &mut problems);
                }
                Event::Snapshot => snapshot_taken = true,
                Event::Restore if !snapshot_taken => {
                    problems.push(format!("{at}: no snapshot was taken before"));
                }
                Event::Visibility { .. }
                | Event::Select { .. }
                | Event::RemoveContainer { .. }
                | Event::Restore => {}
            }
        }
        problems
    }

    /// Parse and check a scenario, failing on the first batch of problems.
    pub fn validated(self) -> Result<Self> {
        let problems = self.problems();
        if !problems.is_empty() {
            bail!("invalid scenario:\n  {}", problems.join("\n  "));
        }
        Ok(self)
    }

    fn container_problems<'a>(
        &self,
        spec: &'a ContainerSpec,
        keys: &mut BTreeSet<&'a str>,
        problems: &mut Vec<String>,
    ) {
        if spec.key.trim().is_empty() {
            problems.push("container with an empty key".to_string());
        } else if !keys.insert(spec.key.as_str()) {
            problems.push(format!("container '{}' is declared twice", spec.key));
        }
        let at = format!("container '{}'", spec.key);
        for kind in spec.accepts.iter().chain(&spec.initial) {
            self.require_kind(&at, kind, problems);
        }
    }

    fn require_kind(&self, at: &str, kind: &str, problems: &mut Vec<String>) {
        if self.destination(kind).is_none() {
            problems.push(format!("{at}: unknown destination '{kind}'"));
        }
    }
}
