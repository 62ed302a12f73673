//! Result channels: delivery, buffering, and teardown.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{ColorPicker, Detail, active_id, controller, kinds, main_key};
use nav_core::{
    InterceptorBuilder, NavigationController, NavigationError, NavigationResult, Outcome,
    ResultChannel, SideEffect,
};
use nav_model::{InstanceId, ResultPayload};

type Received = Rc<RefCell<Vec<NavigationResult<String>>>>;

/// Channel owned by the `home` screen at the bottom of `main`.
fn home_channel(controller: &mut NavigationController) -> (ResultChannel<String>, Received) {
    let home = controller.backstack(&main_key()).unwrap().iter().next().unwrap().id().clone();
    let owner = controller.context_of(&home).unwrap();
    let received: Received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let channel = controller
        .result_channel(owner, "color", move |result| sink.borrow_mut().push(result))
        .unwrap();
    (channel, received)
}

fn open_picker(
    controller: &mut NavigationController,
    channel: &ResultChannel<String>,
) -> InstanceId {
    let home = controller.backstack(&main_key()).unwrap().iter().next().unwrap().id().clone();
    let from = controller.context_of(&home).unwrap();
    controller
        .open_for_result(from, channel, &ColorPicker)
        .unwrap();
    active_id(controller, &main_key())
}

#[test]
fn result_is_delivered_exactly_once() {
    let (mut controller, _root) = controller();
    let (channel, received) = home_channel(&mut controller);
    let picker = open_picker(&mut controller, &channel);

    controller
        .close_with_result(&picker, &"blue".to_string())
        .unwrap();
    assert_eq!(
        *received.borrow(),
        vec![NavigationResult::Completed("blue".to_string())]
    );

    // The picker is gone; closing it again is dropped silently.
    let again = controller
        .close_with_result(&picker, &"red".to_string())
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(received.borrow().len(), 1);
    assert!(controller.pending_results().is_empty());
}

#[test]
fn closing_without_value_reports_closed() {
    let (mut controller, _root) = controller();
    let (channel, received) = home_channel(&mut controller);
    let picker = open_picker(&mut controller, &channel);

    controller.close(&picker).unwrap();
    assert_eq!(*received.borrow(), vec![NavigationResult::Closed]);
}

#[test]
fn result_waits_until_owner_is_active() {
    let (mut controller, root) = controller();
    let (channel, received) = home_channel(&mut controller);
    let picker = open_picker(&mut controller, &channel);
    controller.push(root, &Detail { id: 1 }).unwrap();
    let detail = active_id(&controller, &main_key());

    controller
        .close_with_result(&picker, &"green".to_string())
        .unwrap();
    assert!(received.borrow().is_empty());
    assert_eq!(controller.pending_results().len(), 1);

    controller.close(&detail).unwrap();
    assert_eq!(
        *received.borrow(),
        vec![NavigationResult::Completed("green".to_string())]
    );
    assert!(controller.pending_results().is_empty());
}

#[test]
fn mismatched_result_type_fails_loudly() {
    let (mut controller, _root) = controller();
    let (channel, received) = home_channel(&mut controller);
    let picker = open_picker(&mut controller, &channel);

    let error = controller.close_with_result(&picker, &42_u32).unwrap_err();
    assert!(matches!(error, NavigationError::ResultTypeMismatch { .. }));
    assert!(error.is_contract_violation());
    assert_eq!(kinds(&controller, &main_key()), vec!["home", "color_picker"]);
    assert!(received.borrow().is_empty());
}

#[test]
fn results_for_torn_down_owner_are_discarded() {
    let (mut controller, root) = controller();
    controller.push(root, &Detail { id: 1 }).unwrap();
    let detail = active_id(&controller, &main_key());
    let owner = controller.context_of(&detail).unwrap();
    let received: Received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let channel = controller
        .result_channel(owner, "color", move |result| sink.borrow_mut().push(result))
        .unwrap();
    controller
        .open_for_result(owner, &channel, &ColorPicker)
        .unwrap();
    let picker = active_id(&controller, &main_key());

    // Remove the owner from under the picker.
    let without_owner = controller.backstack(&main_key()).unwrap().close(&detail);
    controller
        .dispatch(nav_core::NavigationInstruction::set_backstack(main_key(), without_owner))
        .unwrap();
    assert!(controller.context_of(&detail).is_none());

    controller
        .close_with_result(&picker, &"blue".to_string())
        .unwrap();
    assert!(received.borrow().is_empty());
    assert!(controller.pending_results().is_empty());
}

#[test]
fn interceptor_can_deliver_without_closing() {
    let (mut controller, _root) = controller();
    controller.add_interceptor(
        InterceptorBuilder::new("keep-picker")
            .on_result::<ColorPicker, _>(|_, value, instance, _| {
                let payload = ResultPayload::new(&value).unwrap();
                Outcome::CancelAnd(SideEffect::deliver_result(instance.id().clone(), payload))
            })
            .build(),
    );
    let (channel, received) = home_channel(&mut controller);
    let picker = open_picker(&mut controller, &channel);

    let dispatch = controller
        .close_with_result(&picker, &"teal".to_string())
        .unwrap();
    assert!(dispatch.was_cancelled());
    assert_eq!(active_id(&controller, &main_key()), picker);
    assert_eq!(controller.pending_results().len(), 1);
    assert!(received.borrow().is_empty());

    // A plain close later does not overwrite the queued value.
    controller.close(&picker).unwrap();
    assert_eq!(
        *received.borrow(),
        vec![NavigationResult::Completed("teal".to_string())]
    );
}

#[test]
fn root_owned_channel_receives_immediately() {
    let (mut controller, root) = controller();
    let received: Received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let channel = controller
        .result_channel(root, "color", move |result| sink.borrow_mut().push(result))
        .unwrap();
    controller
        .open_for_result(root, &channel, &ColorPicker)
        .unwrap();
    let picker = active_id(&controller, &main_key());

    controller
        .close_with_result(&picker, &"blue".to_string())
        .unwrap();
    assert_eq!(received.borrow().len(), 1);
    assert!(controller.unregister_result_channel(channel.id()));
}

#[test]
fn duplicate_channel_is_rejected() {
    let (mut controller, root) = controller();
    controller
        .result_channel::<String, _>(root, "color", |_| {})
        .unwrap();
    let error = controller
        .result_channel::<String, _>(root, "color", |_| {})
        .unwrap_err();
    assert!(matches!(error, NavigationError::DuplicateResultChannel { .. }));
}
