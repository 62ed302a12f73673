//! Folding interceptor chains into one decision.

use std::rc::Rc;

use nav_model::{ContainerKey, Transition};

use super::{
    OpenInterceptor, Outcome, PendingOpen, PendingTransition, SideEffect, TransitionInterceptor,
};
use crate::error::{NavigationError, Result};
use crate::instruction::NavigationInstruction;

/// Effective decision of the open chain.
#[derive(Debug)]
pub enum OpenDecision {
    /// Route the instance as requested.
    Proceed,
    /// Do not open; run the side effect if there is one.
    Cancelled(Option<SideEffect>),
    /// Dispatch this instruction instead. It runs through the whole chain
    /// again.
    Redirect(NavigationInstruction),
}

/// Effective decision of the transition chain.
#[derive(Debug)]
pub enum TransitionDecision {
    /// Publish this transition's target.
    Commit(Transition),
    /// Publish nothing; run the side effect if there is one.
    Cancelled(Option<SideEffect>),
}

/// Globally registered interceptors, in registration order.
#[derive(Default)]
pub struct InterceptorPipeline {
    open: Vec<Rc<dyn OpenInterceptor>>,
    transition: Vec<Rc<dyn TransitionInterceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_open(&mut self, interceptor: Rc<dyn OpenInterceptor>) {
        self.open.push(interceptor);
    }

    pub fn add_transition(&mut self, interceptor: Rc<dyn TransitionInterceptor>) {
        self.transition.push(interceptor);
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transition.len()
    }

    /// Run the open chain. The first non-`Continue` outcome decides.
    pub fn evaluate_open(&self, pending: &PendingOpen<'_>) -> Result<OpenDecision> {
        for interceptor in &self.open {
            let outcome = interceptor
                .intercept_open(pending)
                .map_err(|source| NavigationError::interceptor(interceptor.name(), source))?;
            let decision = match outcome {
                Outcome::Continue => continue,
                Outcome::Cancel => OpenDecision::Cancelled(None),
                Outcome::CancelAnd(effect) => OpenDecision::Cancelled(Some(effect)),
                Outcome::ReplaceWith(instruction) => OpenDecision::Redirect(instruction),
            };
            tracing::debug!(
                interceptor = interceptor.name(),
                instance = %pending.instance().id(),
                descriptor = %pending.instance().descriptor().id(),
                decision = ?decision,
                "Open intercepted"
            );
            return Ok(decision);
        }
        Ok(OpenDecision::Proceed)
    }

    /// Run global interceptors, then `local` ones, over a transition.
    ///
    /// A replaced backstack is diffed against the original previous
    /// backstack and handed to the remaining interceptors. A cancel stops
    /// the chain.
    pub fn evaluate_transition(
        &self,
        local: &[Rc<dyn TransitionInterceptor>],
        container: &ContainerKey,
        transition: Transition,
        cause: &NavigationInstruction,
    ) -> Result<TransitionDecision> {
        let mut current = transition;
        for interceptor in self.transition.iter().chain(local) {
            let pending = PendingTransition::new(container, &current, cause);
            let outcome = interceptor
                .intercept_transition(&pending)
                .map_err(|source| NavigationError::interceptor(interceptor.name(), source))?;
            match outcome {
                Outcome::Continue => {}
                Outcome::Cancel => {
                    tracing::debug!(
                        interceptor = interceptor.name(),
                        container = %container,
                        "Transition cancelled"
                    );
                    return Ok(TransitionDecision::Cancelled(None));
                }
                Outcome::CancelAnd(effect) => {
                    tracing::debug!(
                        interceptor = interceptor.name(),
                        container = %container,
                        "Transition cancelled with side effect"
                    );
                    return Ok(TransitionDecision::Cancelled(Some(effect)));
                }
                Outcome::ReplaceWith(backstack) => {
                    tracing::debug!(
                        interceptor = interceptor.name(),
                        container = %container,
                        entries = backstack.len(),
                        "Transition target replaced"
                    );
                    current = Transition::between(current.previous(), &backstack);
                }
            }
        }
        Ok(TransitionDecision::Commit(current))
    }
}
