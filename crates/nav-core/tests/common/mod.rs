#![allow(dead_code)]

use std::any::Any;

use nav_core::{
    BindingRegistry, ContainerConfig, ContextId, NavigationConfig, NavigationController, Result,
};
use nav_model::{
    Backstack, ContainerKey, Descriptor, Destination, DestinationInstance, InstanceId,
    NavigationDirection, WithResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home;

impl Destination for Home {
    const KIND: &'static str = "home";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub id: u32,
}

impl Destination for Detail {
    const KIND: &'static str = "detail";
}

/// Hosts nested containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tabs;

impl Destination for Tabs {
    const KIND: &'static str = "tabs";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet;

impl Destination for Sheet {
    const KIND: &'static str = "sheet";
    const SUPPORTS_PUSH: bool = false;
    const SUPPORTS_PRESENT: bool = true;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPicker;

impl Destination for ColorPicker {
    const KIND: &'static str = "color_picker";
}

impl WithResult for ColorPicker {
    type Output = String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logout;

impl Destination for Logout {
    const KIND: &'static str = "logout";
}

pub fn main_key() -> ContainerKey {
    ContainerKey::from_static("main")
}

fn label(instance: &DestinationInstance) -> Result<Box<dyn Any>> {
    Ok(Box::new(instance.descriptor().id().to_string()))
}

/// Screen bindings for every test destination except [`Logout`].
pub fn screen_bindings() -> BindingRegistry {
    let mut bindings = BindingRegistry::new();
    bindings.screen::<Home, _>(label).unwrap();
    bindings.screen::<Detail, _>(label).unwrap();
    bindings.screen::<Tabs, _>(label).unwrap();
    bindings.screen::<Sheet, _>(label).unwrap();
    bindings.screen::<ColorPicker, _>(label).unwrap();
    bindings
}

pub fn instance_of<D: Destination>(destination: &D) -> DestinationInstance {
    DestinationInstance::new(
        Descriptor::of(destination).unwrap(),
        NavigationDirection::Push,
    )
}

/// Controller with one root whose `main` container starts at [`Home`].
pub fn controller_with(
    config: NavigationConfig,
    bindings: BindingRegistry,
) -> (NavigationController, ContextId) {
    let mut controller = NavigationController::new(config, bindings);
    let root = controller.register_root("app");
    let initial = Backstack::new().push(instance_of(&Home));
    controller
        .create_container(root, ContainerConfig::new(main_key()).initial_backstack(initial))
        .unwrap();
    (controller, root)
}

pub fn controller() -> (NavigationController, ContextId) {
    controller_with(NavigationConfig::default(), screen_bindings())
}

pub fn active_id(controller: &NavigationController, key: &ContainerKey) -> InstanceId {
    controller.active_instance(key).unwrap().id().clone()
}

pub fn active_kind(controller: &NavigationController, key: &ContainerKey) -> String {
    controller
        .active_instance(key)
        .map(|instance| instance.descriptor().id().to_string())
        .unwrap_or_default()
}

pub fn kinds(controller: &NavigationController, key: &ContainerKey) -> Vec<String> {
    controller
        .backstack(key)
        .unwrap()
        .iter()
        .map(|instance| instance.descriptor().id().to_string())
        .collect()
}
