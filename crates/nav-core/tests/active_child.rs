//! Active-child resolution for containers and roots.

mod common;

use nav_core::{
    ActiveChildTracker, ContainerConfig, NavigationConfig, NavigationController, NavigationSender,
};
use nav_model::ContainerKey;
use proptest::prelude::*;

fn key(name: &'static str) -> ContainerKey {
    ContainerKey::from_static(name)
}

fn with_children() -> (NavigationController, nav_core::ContextId) {
    let mut controller =
        NavigationController::new(NavigationConfig::default(), common::screen_bindings());
    let root = controller.register_root("app");
    for name in ["child1", "child2", "child3"] {
        controller
            .create_container(root, ContainerConfig::new(key(name)))
            .unwrap();
    }
    (controller, root)
}

#[test]
fn container_selection_scenario() {
    let (mut controller, root) = with_children();
    assert_eq!(controller.active_container(root), Some(&key("child1")));

    controller.set_container_visibility(&key("child2"), true).unwrap();
    controller.set_container_visibility(&key("child3"), true).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child2")));

    controller.select_container(&key("child3")).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child3")));

    controller.set_container_visibility(&key("child3"), false).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child2")));

    controller.select_container(&key("child1")).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child1")));
}

#[test]
fn batched_visibility_breaks_ties_by_registration_order() {
    let (mut controller, root) = with_children();
    controller
        .set_container_visibilities(root, &[(key("child3"), true), (key("child2"), true)])
        .unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child2")));
}

#[test]
fn removing_active_container_falls_back() {
    let (mut controller, root) = with_children();
    controller.set_container_visibility(&key("child3"), true).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child3")));

    controller.remove_container(&key("child3")).unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child1")));
}

#[test]
fn visibility_for_unknown_container_is_an_error() {
    let (mut controller, _root) = with_children();
    assert!(
        controller
            .set_container_visibility(&key("ghost"), true)
            .is_err()
    );
}

#[test]
fn roots_use_the_same_resolution() {
    let mut controller =
        NavigationController::new(NavigationConfig::default(), common::screen_bindings());
    let main = controller.register_root("main");
    let settings = controller.register_root("settings");
    assert_eq!(controller.active_root(), Some(main));

    controller.set_root_visibility(settings, true);
    assert_eq!(controller.active_root(), Some(settings));

    controller.select_root(main);
    assert_eq!(controller.active_root(), Some(main));

    controller.unregister_root(main).unwrap();
    assert_eq!(controller.active_root(), Some(settings));
    assert_eq!(controller.roots(), &[settings]);
}

#[test]
fn commands_from_other_threads_apply_in_order() {
    let (mut controller, root) = with_children();
    let sender: NavigationSender = controller.sender();

    let worker = std::thread::spawn(move || {
        sender
            .set_container_visibility(ContainerKey::from_static("child2"), true)
            .unwrap();
        sender
            .select_container(ContainerKey::from_static("child3"))
            .unwrap();
    });
    worker.join().unwrap();

    // Nothing changes until the owning thread drains the queue.
    assert_eq!(controller.active_container(root), Some(&key("child1")));
    controller.process_pending().unwrap();
    assert_eq!(controller.active_container(root), Some(&key("child3")));
}

#[test]
fn sending_to_a_dropped_controller_fails() {
    let (controller, _root) = with_children();
    let sender = controller.sender();
    drop(controller);

    let error = sender.select_container(key("child1")).unwrap_err();
    assert!(matches!(error, nav_core::NavigationError::ControllerDropped));
    assert!(!error.is_contract_violation());
}

#[derive(Debug, Clone)]
enum Event {
    Register(u8),
    Unregister(u8),
    Visible(u8, bool),
    Select(u8),
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (0_u8..5).prop_map(Event::Register),
        (0_u8..5).prop_map(Event::Unregister),
        ((0_u8..5), any::<bool>()).prop_map(|(child, visible)| Event::Visible(child, visible)),
        (0_u8..5).prop_map(Event::Select),
    ]
}

proptest! {
    #[test]
    fn active_child_is_always_registered(events in prop::collection::vec(event(), 0..64)) {
        let mut tracker = ActiveChildTracker::new();
        for event in events {
            match event {
                Event::Register(child) => { tracker.register(child); }
                Event::Unregister(child) => { tracker.unregister(&child); }
                Event::Visible(child, visible) => { tracker.set_visibility(&child, visible); }
                Event::Select(child) => { tracker.set_active(&child); }
            }

            // Never empty while something is registered.
            prop_assert_eq!(tracker.active().is_some(), !tracker.is_empty());
            if let Some(active) = tracker.active() {
                prop_assert!(tracker.is_registered(active));
            }
            // An explicit selection always wins while it stands.
            if let Some(explicit) = tracker.explicit() {
                prop_assert_eq!(tracker.active(), Some(explicit));
            }
        }
    }

    #[test]
    fn visible_active_child_is_kept(
        events in prop::collection::vec(event(), 0..64),
        extra in 0_u8..5,
    ) {
        let mut tracker = ActiveChildTracker::new();
        for event in events {
            match event {
                Event::Register(child) => { tracker.register(child); }
                Event::Unregister(child) => { tracker.unregister(&child); }
                Event::Visible(child, visible) => { tracker.set_visibility(&child, visible); }
                Event::Select(child) => { tracker.set_active(&child); }
            }
        }
        let Some(active) = tracker.active().copied() else {
            return Ok(());
        };
        if !tracker.is_visible(&active) || extra == active {
            return Ok(());
        }
        // Another child becoming visible does not steal a visible active child.
        tracker.set_visibility(&extra, true);
        prop_assert_eq!(tracker.active(), Some(&active));
    }
}
