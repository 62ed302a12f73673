//! Routing, interception, and container lifecycle through the controller.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{
    ColorPicker, Detail, Home, Logout, Sheet, Tabs, active_id, active_kind, controller,
    controller_with, instance_of, kinds, main_key, screen_bindings,
};
use nav_core::{
    ContainerConfig, ContainerFilter, ContextId, EmptyBehavior, InterceptorBuilder,
    InterceptorError, NavigationConfig, NavigationController, NavigationError,
    NavigationInstruction, NavigationPlugin, Outcome, PendingTransition, TransitionInterceptor,
};
use nav_model::{
    Backstack, Capabilities, ContainerKey, Descriptor, DescriptorId, DestinationInstance,
    MetadataKey, NavigationDirection,
};

#[test]
fn push_and_close() {
    let (mut controller, root) = controller();

    let dispatch = controller.push(root, &Detail { id: 1 }).unwrap();
    let transition = dispatch.for_container(&main_key()).unwrap();
    assert_eq!(transition.opened().len(), 1);
    assert!(transition.closed().is_empty());
    assert_eq!(kinds(&controller, &main_key()), vec!["home", "detail"]);

    let detail = active_id(&controller, &main_key());
    assert!(controller.context_of(&detail).is_some());

    controller.close(&detail).unwrap();
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
    assert!(controller.context_of(&detail).is_none());

    // A second close of the same id is a no-op.
    let again = controller.close(&detail).unwrap();
    assert!(again.is_empty());
    assert!(!again.was_cancelled());
}

#[test]
fn unsupported_direction_is_rejected() {
    let (mut controller, root) = controller();

    let error = controller.present(root, &Home).unwrap_err();
    assert!(matches!(error, NavigationError::UnsupportedDirection { .. }));
    assert!(error.is_contract_violation());
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
}

#[test]
fn missing_binding_is_rejected() {
    let (mut controller, root) = controller();

    let ghost = Descriptor::new(
        DescriptorId::from_static("ghost"),
        Capabilities::push_only(),
        serde_json::Value::Null,
    );
    let error = controller
        .dispatch(NavigationInstruction::push(root, ghost))
        .unwrap_err();
    assert!(matches!(error, NavigationError::MissingBinding { .. }));
}

fn filtered(config: NavigationConfig) -> (NavigationController, ContextId) {
    let mut controller = NavigationController::new(config, screen_bindings());
    let root = controller.register_root("app");
    let filter = ContainerFilter::kinds([
        DescriptorId::from_static("home"),
        DescriptorId::from_static("detail"),
    ]);
    controller
        .create_container(root, ContainerConfig::new(main_key()).filter(filter))
        .unwrap();
    (controller, root)
}

#[test]
fn unhandled_open_is_ignored_when_lenient() {
    let (mut controller, root) = filtered(NavigationConfig::default());

    let dispatch = controller.push(root, &ColorPicker).unwrap();
    assert!(dispatch.is_empty());
    assert!(controller.backstack(&main_key()).unwrap().is_empty());
}

#[test]
fn unhandled_open_fails_when_strict() {
    let (mut controller, root) = filtered(NavigationConfig::default().strict());

    let error = controller.push(root, &ColorPicker).unwrap_err();
    assert!(matches!(error, NavigationError::UnhandledInstruction { .. }));
}

#[test]
fn push_goes_to_nearest_container_and_present_to_root() {
    let (mut controller, root) = controller();
    controller.push(root, &Tabs).unwrap();
    let tabs = controller
        .context_of(&active_id(&controller, &main_key()))
        .unwrap();
    let tab = ContainerKey::from_static("tab");
    controller
        .create_container(tabs, ContainerConfig::new(tab.clone()))
        .unwrap();

    controller.push(tabs, &Detail { id: 7 }).unwrap();
    assert_eq!(kinds(&controller, &tab), vec!["detail"]);
    assert_eq!(kinds(&controller, &main_key()), vec!["home", "tabs"]);

    controller.present(tabs, &Sheet).unwrap();
    assert_eq!(kinds(&controller, &tab), vec!["detail"]);
    assert_eq!(active_kind(&controller, &main_key()), "sheet");
}

#[test]
fn present_skips_containers_that_refuse_it() {
    let mut controller = NavigationController::new(
        NavigationConfig::default(),
        screen_bindings(),
    );
    let root = controller.register_root("app");
    let modal = ContainerKey::from_static("modal");
    controller
        .create_container(
            root,
            ContainerConfig::new(main_key()).filter(ContainerFilter::custom(|instance| {
                instance.direction() == NavigationDirection::Push
            })),
        )
        .unwrap();
    controller
        .create_container(
            root,
            ContainerConfig::new(modal.clone()).filter(ContainerFilter::custom(|instance| {
                instance.direction() == NavigationDirection::Present
            })),
        )
        .unwrap();

    controller.push(root, &Home).unwrap();
    controller.present(root, &Sheet).unwrap();
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
    assert_eq!(kinds(&controller, &modal), vec!["sheet"]);
}

#[test]
fn cancel_leaves_backstack_unchanged() {
    let (mut controller, root) = controller();
    controller.add_interceptor(
        InterceptorBuilder::new("keep-home")
            .on_close::<Home, _>(|_, _, _| Outcome::Cancel)
            .build(),
    );
    controller.push(root, &Detail { id: 1 }).unwrap();
    let before = controller.backstack(&main_key()).unwrap().clone();

    let home = before.iter().next().unwrap().id().clone();
    let dispatch = controller.close(&home).unwrap();
    assert!(dispatch.was_cancelled());
    assert!(dispatch.is_empty());
    assert_eq!(controller.backstack(&main_key()).unwrap(), &before);

    // Closing something else still works.
    let detail = active_id(&controller, &main_key());
    controller.close(&detail).unwrap();
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
}

#[test]
fn container_interceptor_can_replace_target() {
    let mut controller = NavigationController::new(
        NavigationConfig::default(),
        screen_bindings(),
    );
    let root = controller.register_root("app");
    // Keeps at most two entries: pushing a third drops the oldest.
    struct Cap;
    impl TransitionInterceptor for Cap {
        fn intercept_transition(
            &self,
            pending: &PendingTransition<'_>,
        ) -> Result<Outcome<Backstack>, InterceptorError> {
            let target = pending.transition().target();
            if target.len() <= 2 {
                return Ok(Outcome::Continue);
            }
            let kept = target.iter().skip(target.len() - 2).cloned();
            Ok(Outcome::ReplaceWith(Backstack::from_instances(kept)))
        }
    }
    controller
        .create_container(root, ContainerConfig::new(main_key()).interceptor(Rc::new(Cap)))
        .unwrap();

    for id in 1..=3 {
        controller.push(root, &Detail { id }).unwrap();
    }
    let ids: Vec<u32> = controller
        .backstack(&main_key())
        .unwrap()
        .iter()
        .map(|instance| instance.descriptor().decode::<Detail>().unwrap().id)
        .collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn open_redirect_is_followed() {
    let (mut controller, root) = controller();
    controller.add_interceptor(
        InterceptorBuilder::new("upgrade-detail")
            .on_open::<Detail, _>(|detail, pending| {
                if detail.id != 0 {
                    return Outcome::Continue;
                }
                let upgraded = DestinationInstance::new(
                    Descriptor::of(&Detail { id: 99 }).unwrap(),
                    pending.instance().direction(),
                );
                Outcome::ReplaceWith(NavigationInstruction::open(pending.from(), upgraded))
            })
            .build(),
    );

    controller.push(root, &Detail { id: 0 }).unwrap();
    let active = controller.active_instance(&main_key()).unwrap();
    assert_eq!(active.descriptor().decode::<Detail>().unwrap(), Detail { id: 99 });
}

#[test]
fn endless_redirects_are_a_loop() {
    let (mut controller, root) = controller();
    controller.add_interceptor(
        InterceptorBuilder::new("bounce")
            .on_open::<Detail, _>(|detail, pending| {
                let next = Detail { id: detail.id + 1 };
                Outcome::ReplaceWith(NavigationInstruction::push(
                    pending.from(),
                    Descriptor::of(&next).unwrap(),
                ))
            })
            .build(),
    );

    let error = controller.push(root, &Detail { id: 0 }).unwrap_err();
    assert!(matches!(error, NavigationError::RedirectLoop { limit: 5 }));
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
}

#[test]
fn synthetic_destination_runs_without_an_instance() {
    let ran = Rc::new(Cell::new(0));
    let mut bindings = screen_bindings();
    let counter = Rc::clone(&ran);
    bindings
        .synthetic::<Logout, _>(move |controller, request| {
            counter.set(counter.get() + 1);
            // Reset the history back to a single home screen.
            let reset = Backstack::new().push(instance_of(&Home));
            controller.dispatch(NavigationInstruction::set_backstack(main_key(), reset))?;
            assert_eq!(request.instance.descriptor().id().as_str(), "logout");
            Ok(())
        })
        .unwrap();
    let (mut controller, root) = controller_with(NavigationConfig::default(), bindings);
    controller.push(root, &Detail { id: 1 }).unwrap();

    controller.open(root, &Logout).unwrap();
    assert_eq!(ran.get(), 1);
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
    assert!(
        controller
            .backstack(&main_key())
            .unwrap()
            .iter()
            .all(|instance| instance.descriptor().id().as_str() != "logout")
    );
}

#[test]
fn create_destination_uses_screen_binding() {
    let (controller, _root) = controller();
    let home = active_id(&controller, &main_key());

    let built = controller.create_destination(&home).unwrap().unwrap();
    assert_eq!(built.downcast_ref::<String>().map(String::as_str), Some("home"));

    let unknown = nav_model::InstanceId::generate();
    assert!(controller.create_destination(&unknown).unwrap().is_none());
}

#[test]
fn emptied_container_closes_its_host() {
    let (mut controller, root) = controller();
    controller.push(root, &Tabs).unwrap();
    let tabs_instance = active_id(&controller, &main_key());
    let tabs = controller.context_of(&tabs_instance).unwrap();

    let tab = ContainerKey::from_static("tab");
    let initial = Backstack::new().push(instance_of(&Detail { id: 1 }));
    controller
        .create_container(
            tabs,
            ContainerConfig::new(tab.clone())
                .initial_backstack(initial)
                .empty_behavior(EmptyBehavior::CloseParent),
        )
        .unwrap();
    let detail = active_id(&controller, &tab);

    let dispatch = controller.close(&detail).unwrap();
    assert!(dispatch.for_container(&tab).is_some());
    assert!(dispatch.for_container(&main_key()).is_some());
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
    assert!(controller.container(&tab).is_none());
    assert!(controller.context(tabs).is_none());
}

#[test]
fn removing_host_tears_down_nested_state() {
    let (mut controller, root) = controller();
    controller.push(root, &Tabs).unwrap();
    let tabs_instance = active_id(&controller, &main_key());
    let tabs = controller.context_of(&tabs_instance).unwrap();
    let tab = ContainerKey::from_static("tab");
    controller
        .create_container(
            tabs,
            ContainerConfig::new(tab.clone())
                .initial_backstack(Backstack::new().push(instance_of(&Detail { id: 1 }))),
        )
        .unwrap();
    let nested = active_id(&controller, &tab);
    let contexts_before = controller.context_count();

    controller.close(&tabs_instance).unwrap();
    assert!(controller.container(&tab).is_none());
    assert!(controller.context_of(&nested).is_none());
    assert_eq!(controller.context_count(), contexts_before - 2);
}

#[derive(Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl NavigationPlugin for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_opened(&mut self, container: &ContainerKey, instance: &DestinationInstance) {
        self.events
            .borrow_mut()
            .push(format!("opened {container} {}", instance.descriptor().id()));
    }

    fn on_closed(&mut self, container: &ContainerKey, instance: &DestinationInstance) {
        self.events
            .borrow_mut()
            .push(format!("closed {container} {}", instance.descriptor().id()));
    }

    fn on_active(&mut self, container: &ContainerKey, instance: Option<&DestinationInstance>) {
        let kind = instance.map_or_else(|| "none".to_string(), |i| i.descriptor().id().to_string());
        self.events
            .borrow_mut()
            .push(format!("active {container} {kind}"));
    }
}

#[test]
fn plugins_observe_commits() {
    let (mut controller, root) = controller();
    let events = Rc::new(RefCell::new(Vec::new()));
    controller.add_plugin(Box::new(Recorder {
        events: Rc::clone(&events),
    }));

    controller.push(root, &Detail { id: 1 }).unwrap();
    let detail = active_id(&controller, &main_key());
    controller.close(&detail).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "opened main detail",
            "active main detail",
            "closed main detail",
            "active main home",
        ]
    );
}

#[test]
fn set_backstack_replaces_history() {
    let (mut controller, _root) = controller();
    let replacement = Backstack::from_instances([
        instance_of(&Detail { id: 1 }),
        instance_of(&Detail { id: 2 }),
    ]);

    let dispatch = controller
        .dispatch(NavigationInstruction::set_backstack(main_key(), replacement.clone()))
        .unwrap();
    let transition = dispatch.for_container(&main_key()).unwrap();
    assert_eq!(transition.opened().len(), 2);
    assert_eq!(transition.closed().len(), 1);
    assert_eq!(controller.backstack(&main_key()).unwrap(), &replacement);

    let error = controller
        .dispatch(NavigationInstruction::set_backstack(
            ContainerKey::from_static("nowhere"),
            Backstack::new(),
        ))
        .unwrap_err();
    assert!(matches!(error, NavigationError::UnknownContainer { .. }));
}

#[test]
fn set_backstack_publishes_metadata_updates() {
    const STYLE: MetadataKey<String> = MetadataKey::new("test.style");
    let (mut controller, root) = controller();
    controller.push(root, &Detail { id: 1 }).unwrap();
    let detail = active_id(&controller, &main_key());

    let mut instances: Vec<DestinationInstance> =
        controller.backstack(&main_key()).unwrap().iter().cloned().collect();
    instances
        .last_mut()
        .unwrap()
        .metadata_mut()
        .set(&STYLE, "sheet".to_string())
        .unwrap();
    let dispatch = controller
        .dispatch(NavigationInstruction::set_backstack(
            main_key(),
            Backstack::from_instances(instances),
        ))
        .unwrap();

    let transition = dispatch.for_container(&main_key()).unwrap();
    assert!(transition.opened().is_empty());
    assert!(transition.closed().is_empty());
    assert_eq!(transition.updated().len(), 1);
    let active = controller.active_instance(&main_key()).unwrap();
    assert_eq!(active.id(), &detail);
    assert_eq!(active.metadata().get(&STYLE).as_deref(), Some("sheet"));
    assert!(controller.context_of(&detail).is_some());
}

#[test]
fn set_backstack_rejects_unrenderable_instances() {
    let mut bindings = screen_bindings();
    bindings.synthetic::<Logout, _>(|_, _| Ok(())).unwrap();
    let (mut controller, _root) = controller_with(NavigationConfig::default(), bindings);

    let ghost = DestinationInstance::new(
        Descriptor::new(
            DescriptorId::from_static("ghost"),
            Capabilities::push_only(),
            serde_json::Value::Null,
        ),
        NavigationDirection::Push,
    );
    let error = controller
        .dispatch(NavigationInstruction::set_backstack(
            main_key(),
            Backstack::new().push(ghost),
        ))
        .unwrap_err();
    assert!(matches!(error, NavigationError::MissingBinding { .. }));

    let error = controller
        .dispatch(NavigationInstruction::set_backstack(
            main_key(),
            Backstack::new().push(instance_of(&Logout)),
        ))
        .unwrap_err();
    assert!(matches!(error, NavigationError::NotRenderable { .. }));

    // Sheets can only be presented.
    let error = controller
        .dispatch(NavigationInstruction::set_backstack(
            main_key(),
            Backstack::new().push(instance_of(&Sheet)),
        ))
        .unwrap_err();
    assert!(matches!(error, NavigationError::UnsupportedDirection { .. }));
    assert_eq!(kinds(&controller, &main_key()), vec!["home"]);
}

#[test]
fn container_with_unbound_initial_screen_is_not_created() {
    let (mut controller, root) = controller();
    let side = ContainerKey::from_static("side");
    let ghost = DestinationInstance::new(
        Descriptor::new(
            DescriptorId::from_static("ghost"),
            Capabilities::push_only(),
            serde_json::Value::Null,
        ),
        NavigationDirection::Push,
    );
    let error = controller
        .create_container(
            root,
            ContainerConfig::new(side.clone()).initial_backstack(Backstack::new().push(ghost)),
        )
        .unwrap_err();
    assert!(matches!(error, NavigationError::MissingBinding { .. }));
    assert!(controller.container(&side).is_none());
}

#[test]
fn duplicate_container_is_rejected() {
    let (mut controller, root) = controller();
    let error = controller
        .create_container(root, ContainerConfig::new(main_key()))
        .unwrap_err();
    assert!(matches!(error, NavigationError::DuplicateContainer { .. }));
}
