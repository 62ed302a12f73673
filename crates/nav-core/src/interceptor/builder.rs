//! Typed interceptor construction.
//!
//! ```ignore
//! let auth = InterceptorBuilder::new("auth")
//!     .on_open::<Checkout, _>(|_, pending| {
//!         if signed_in() {
//!             Outcome::Continue
//!         } else {
//!             Outcome::ReplaceWith(NavigationInstruction::present(pending.from(), sign_in()))
//!         }
//!     })
//!     .on_close::<Checkout, _>(|_, closing, _| {
//!         analytics::abandoned(closing.id());
//!         Outcome::Continue
//!     })
//!     .build();
//! ```
//!
//! Hooks only fire for their destination type. Every other destination gets
//! `Continue`, so a typed hook cannot stall the rest of the chain.

use nav_model::{Backstack, Destination, DestinationInstance, WithResult};

use super::{
    InterceptorError, OpenInterceptor, Outcome, PendingOpen, PendingTransition,
    TransitionInterceptor,
};
use crate::instruction::NavigationInstruction;

type HookResult<R> = std::result::Result<Outcome<R>, InterceptorError>;
type OpenHook = Box<dyn Fn(&PendingOpen<'_>) -> HookResult<NavigationInstruction>>;
type TransitionHook = Box<dyn Fn(&PendingTransition<'_>) -> HookResult<Backstack>>;

/// Collects typed hooks into one interceptor.
pub struct InterceptorBuilder {
    name: String,
    open_hooks: Vec<OpenHook>,
    transition_hooks: Vec<TransitionHook>,
}

impl InterceptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            open_hooks: Vec::new(),
            transition_hooks: Vec::new(),
        }
    }

    /// Run `hook` before a `D` is opened.
    #[must_use]
    pub fn on_open<D, F>(mut self, hook: F) -> Self
    where
        D: Destination,
        F: Fn(&D, &PendingOpen<'_>) -> Outcome<NavigationInstruction> + 'static,
    {
        let typed = move |pending: &PendingOpen<'_>| -> HookResult<NavigationInstruction> {
            let descriptor = pending.instance().descriptor();
            if !descriptor.is::<D>() {
                return Ok(Outcome::Continue);
            }
            let destination = descriptor.decode::<D>()?;
            Ok(hook(&destination, pending))
        };
        self.open_hooks.push(Box::new(typed));
        self
    }

    /// Run `hook` when a `D` closes without a result.
    #[must_use]
    pub fn on_close<D, F>(mut self, hook: F) -> Self
    where
        D: Destination,
        F: Fn(&D, &DestinationInstance, &PendingTransition<'_>) -> Outcome<Backstack> + 'static,
    {
        let typed = move |pending: &PendingTransition<'_>| -> HookResult<Backstack> {
            for closing in pending.transition().closed() {
                if !closing.descriptor().is::<D>() || pending.result_for(closing.id()).is_some()
                {
                    continue;
                }
                let destination = closing.descriptor().decode::<D>()?;
                let outcome = hook(&destination, closing, pending);
                if !outcome.is_continue() {
                    return Ok(outcome);
                }
            }
            Ok(Outcome::Continue)
        };
        self.transition_hooks.push(Box::new(typed));
        self
    }

    /// Run `hook` when a `D` closes with its result.
    #[must_use]
    pub fn on_result<D, F>(mut self, hook: F) -> Self
    where
        D: WithResult,
        F: Fn(&D, D::Output, &DestinationInstance, &PendingTransition<'_>) -> Outcome<Backstack>
            + 'static,
    {
        let typed = move |pending: &PendingTransition<'_>| -> HookResult<Backstack> {
            for closing in pending.transition().closed() {
                if !closing.descriptor().is::<D>() {
                    continue;
                }
                let Some(payload) = pending.result_for(closing.id()) else {
                    continue;
                };
                let destination = closing.descriptor().decode::<D>()?;
                let value = payload.decode::<D::Output>()?;
                let outcome = hook(&destination, value, closing, pending);
                if !outcome.is_continue() {
                    return Ok(outcome);
                }
            }
            Ok(Outcome::Continue)
        };
        self.transition_hooks.push(Box::new(typed));
        self
    }

    pub fn build(self) -> BuiltInterceptor {
        BuiltInterceptor {
            name: self.name,
            open_hooks: self.open_hooks,
            transition_hooks: self.transition_hooks,
        }
    }
}

/// An interceptor assembled by [`InterceptorBuilder`].
///
/// Implements both interceptor families; register it with
/// [`NavigationController::add_interceptor`](crate::NavigationController::add_interceptor).
pub struct BuiltInterceptor {
    name: String,
    open_hooks: Vec<OpenHook>,
    transition_hooks: Vec<TransitionHook>,
}

impl BuiltInterceptor {
    pub fn has_open_hooks(&self) -> bool {
        !self.open_hooks.is_empty()
    }

    pub fn has_transition_hooks(&self) -> bool {
        !self.transition_hooks.is_empty()
    }
}

impl OpenInterceptor for BuiltInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept_open(&self, pending: &PendingOpen<'_>) -> HookResult<NavigationInstruction> {
        for hook in &self.open_hooks {
            let outcome = hook(pending)?;
            if !outcome.is_continue() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Continue)
    }
}

impl TransitionInterceptor for BuiltInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept_transition(&self, pending: &PendingTransition<'_>) -> HookResult<Backstack> {
        for hook in &self.transition_hooks {
            let outcome = hook(pending)?;
            if !outcome.is_continue() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Continue)
    }
}
