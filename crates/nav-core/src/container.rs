//! Containers: named navigation hosts with their own backstack.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use nav_model::{Backstack, ContainerKey, DescriptorId, DestinationInstance};

use crate::config::EmptyBehavior;
use crate::context::ContextId;
use crate::interceptor::TransitionInterceptor;

/// Which instances a container accepts when an open is routed to it.
///
/// Filters only affect routing. A backstack set explicitly on the container
/// is taken as given.
#[derive(Clone, Default)]
pub enum ContainerFilter {
    #[default]
    AcceptAll,
    AcceptNone,
    /// Accept only these destination kinds.
    Kinds(BTreeSet<DescriptorId>),
    Custom(Rc<dyn Fn(&DestinationInstance) -> bool>),
}

impl ContainerFilter {
    pub fn kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = DescriptorId>,
    {
        Self::Kinds(kinds.into_iter().collect())
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&DestinationInstance) -> bool + 'static,
    {
        Self::Custom(Rc::new(predicate))
    }

    pub fn accepts(&self, instance: &DestinationInstance) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::AcceptNone => false,
            Self::Kinds(kinds) => kinds.contains(instance.descriptor().id()),
            Self::Custom(predicate) => predicate(instance),
        }
    }
}

impl fmt::Debug for ContainerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptAll => f.write_str("AcceptAll"),
            Self::AcceptNone => f.write_str("AcceptNone"),
            Self::Kinds(kinds) => f.debug_tuple("Kinds").field(kinds).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How to build a container.
pub struct ContainerConfig {
    pub(crate) key: ContainerKey,
    pub(crate) filter: ContainerFilter,
    pub(crate) empty_behavior: Option<EmptyBehavior>,
    pub(crate) initial: Backstack,
    pub(crate) interceptors: Vec<Rc<dyn TransitionInterceptor>>,
}

impl ContainerConfig {
    pub fn new(key: ContainerKey) -> Self {
        Self {
            key,
            filter: ContainerFilter::AcceptAll,
            empty_behavior: None,
            initial: Backstack::new(),
            interceptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: ContainerFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Override the controller's default empty behavior.
    #[must_use]
    pub fn empty_behavior(mut self, behavior: EmptyBehavior) -> Self {
        self.empty_behavior = Some(behavior);
        self
    }

    /// Backstack used unless saved state exists for this key.
    #[must_use]
    pub fn initial_backstack(mut self, backstack: Backstack) -> Self {
        self.initial = backstack;
        self
    }

    /// Transition interceptor that only sees this container's transitions.
    /// Runs after every global transition interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Rc<dyn TransitionInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn key(&self) -> &ContainerKey {
        &self.key
    }
}

/// A live container.
pub struct Container {
    key: ContainerKey,
    owner: ContextId,
    backstack: Backstack,
    filter: ContainerFilter,
    empty_behavior: EmptyBehavior,
    interceptors: Vec<Rc<dyn TransitionInterceptor>>,
}

impl Container {
    pub(crate) fn new(
        config: ContainerConfig,
        owner: ContextId,
        default_empty: EmptyBehavior,
    ) -> Self {
        Self {
            key: config.key,
            owner,
            backstack: Backstack::new(),
            filter: config.filter,
            empty_behavior: config.empty_behavior.unwrap_or(default_empty),
            interceptors: config.interceptors,
        }
    }

    pub fn key(&self) -> &ContainerKey {
        &self.key
    }

    /// Context that hosts this container.
    pub fn owner(&self) -> ContextId {
        self.owner
    }

    pub fn backstack(&self) -> &Backstack {
        &self.backstack
    }

    /// Instance the renderer should display.
    pub fn active(&self) -> Option<&DestinationInstance> {
        self.backstack.active()
    }

    pub fn filter(&self) -> &ContainerFilter {
        &self.filter
    }

    pub fn accepts(&self, instance: &DestinationInstance) -> bool {
        self.filter.accepts(instance)
    }

    pub fn empty_behavior(&self) -> EmptyBehavior {
        self.empty_behavior
    }

    pub(crate) fn interceptors(&self) -> &[Rc<dyn TransitionInterceptor>] {
        &self.interceptors
    }

    pub(crate) fn set_backstack(&mut self, backstack: Backstack) {
        self.backstack = backstack;
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("backstack", &self.backstack)
            .field("filter", &self.filter)
            .field("empty_behavior", &self.empty_behavior)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use nav_model::{Capabilities, Descriptor, NavigationDirection};

    use super::*;

    fn instance(kind: &str) -> DestinationInstance {
        DestinationInstance::new(
            Descriptor::new(
                DescriptorId::new(kind).unwrap(),
                Capabilities::push_and_present(),
                serde_json::Value::Null,
            ),
            NavigationDirection::Push,
        )
    }

    #[test]
    fn kind_filter() {
        let filter = ContainerFilter::kinds([DescriptorId::from_static("home")]);
        assert!(filter.accepts(&instance("home")));
        assert!(!filter.accepts(&instance("detail")));
    }

    #[test]
    fn custom_filter() {
        let filter = ContainerFilter::custom(|instance| {
            instance.direction() == NavigationDirection::Present
        });
        assert!(!filter.accepts(&instance("home")));
        assert!(!ContainerFilter::AcceptNone.accepts(&instance("home")));
        assert!(ContainerFilter::default().accepts(&instance("home")));
    }
}
