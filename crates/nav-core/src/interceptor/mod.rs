//! Interceptors over pending navigation.
//!
//! Every mutation passes through two interceptor families before it is
//! committed:
//!
//! - **Open interceptors** see an instance before it is routed into a
//!   container. They can veto the open or redirect it to another
//!   instruction.
//! - **Transition interceptors** see the computed [`Transition`] for one
//!   container before the new backstack is published. They can veto it or
//!   substitute a different target backstack.
//!
//! Interceptors report their decision through [`Outcome`]; returning an
//! error aborts the pipeline and reaches the caller of the dispatch as
//! [`NavigationError::Interceptor`](crate::NavigationError::Interceptor).

mod builder;
mod pipeline;

use std::fmt;

use nav_model::{
    Backstack, ContainerKey, DestinationInstance, InstanceId, PendingOutcome, ResultPayload,
    Transition,
};

use crate::context::ContextId;
use crate::controller::NavigationController;
use crate::dispatch::Dispatch;
use crate::error::Result;
use crate::instruction::NavigationInstruction;

pub use builder::{BuiltInterceptor, InterceptorBuilder};
pub use pipeline::{InterceptorPipeline, OpenDecision, TransitionDecision};

/// Unexpected failure inside an interceptor.
pub type InterceptorError = Box<dyn std::error::Error + Send + Sync>;

/// Decision of one interceptor.
#[derive(Debug)]
pub enum Outcome<R> {
    /// Let the operation proceed unchanged (to the next interceptor).
    Continue,
    /// Drop the operation; nothing is published.
    Cancel,
    /// Drop the operation, then run a side effect against the controller.
    CancelAnd(SideEffect),
    /// Substitute a different operation.
    ReplaceWith(R),
}

impl<R> Outcome<R> {
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

type SideEffectFn = Box<dyn FnOnce(&mut NavigationController) -> Result<Dispatch>>;

/// Deferred work attached to a cancelled operation.
pub struct SideEffect(SideEffectFn);

impl SideEffect {
    pub fn new<F>(effect: F) -> Self
    where
        F: FnOnce(&mut NavigationController) -> Result<Dispatch> + 'static,
    {
        Self(Box::new(effect))
    }

    /// Deliver a result for `instance` without closing it.
    pub fn deliver_result(instance: InstanceId, payload: ResultPayload) -> Self {
        Self::new(move |controller| {
            controller.post_result_for(&instance, PendingOutcome::Result { payload });
            Ok(Dispatch::default())
        })
    }

    /// Run a follow-up instruction.
    pub fn dispatch(instruction: NavigationInstruction) -> Self {
        Self::new(move |controller| controller.dispatch(instruction))
    }

    pub(crate) fn run(self, controller: &mut NavigationController) -> Result<Dispatch> {
        (self.0)(controller)
    }
}

impl fmt::Debug for SideEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SideEffect(..)")
    }
}

/// An open about to be routed.
#[derive(Debug, Clone, Copy)]
pub struct PendingOpen<'a> {
    from: ContextId,
    instance: &'a DestinationInstance,
    redirects: usize,
}

impl<'a> PendingOpen<'a> {
    pub fn new(from: ContextId, instance: &'a DestinationInstance, redirects: usize) -> Self {
        Self {
            from,
            instance,
            redirects,
        }
    }

    /// Context the open was requested from.
    pub fn from(&self) -> ContextId {
        self.from
    }

    pub fn instance(&self) -> &'a DestinationInstance {
        self.instance
    }

    /// How many redirects led to this open.
    pub fn redirects(&self) -> usize {
        self.redirects
    }
}

/// A transition about to be committed to one container.
#[derive(Debug, Clone, Copy)]
pub struct PendingTransition<'a> {
    container: &'a ContainerKey,
    transition: &'a Transition,
    cause: &'a NavigationInstruction,
}

impl<'a> PendingTransition<'a> {
    pub fn new(
        container: &'a ContainerKey,
        transition: &'a Transition,
        cause: &'a NavigationInstruction,
    ) -> Self {
        Self {
            container,
            transition,
            cause,
        }
    }

    pub fn container(&self) -> &'a ContainerKey {
        self.container
    }

    pub fn transition(&self) -> &'a Transition {
        self.transition
    }

    /// Instruction that produced this transition.
    pub fn cause(&self) -> &'a NavigationInstruction {
        self.cause
    }

    /// Result payload the cause carries for `id`, if it closes `id` with one.
    pub fn result_for(&self, id: &InstanceId) -> Option<&'a ResultPayload> {
        match self.cause {
            NavigationInstruction::CloseWithResult { id: closing, payload } if closing == id => {
                Some(payload)
            }
            _ => None,
        }
    }
}

/// Sees every open before it is routed.
pub trait OpenInterceptor {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn intercept_open(
        &self,
        pending: &PendingOpen<'_>,
    ) -> std::result::Result<Outcome<NavigationInstruction>, InterceptorError>;
}

/// Sees every transition before it is committed.
pub trait TransitionInterceptor {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn intercept_transition(
        &self,
        pending: &PendingTransition<'_>,
    ) -> std::result::Result<Outcome<Backstack>, InterceptorError>;
}
