//! Navigation state machine.
//!
//! [`NavigationController`] tracks where the user is across a tree of
//! navigation roots and nested containers. Every change is expressed as a
//! [`NavigationInstruction`], runs through the interceptor pipeline, and is
//! committed as a [`Transition`](nav_model::Transition) per container:
//!
//! ```text
//! instruction ──► open interceptors ──► routing ──► transition interceptors ──► commit
//!                                                                                 │
//!                          plugins ◄── contexts ◄── result channels ◄─────────────┘
//! ```
//!
//! - **Containers** (`container`) own a backstack and a filter; each context
//!   resolves its active container with [`ActiveChildTracker`]
//! - **Interceptors** (`interceptor`) can veto, redirect, or rewrite
//!   navigation before anything is published
//! - **Results** (`result`) route a typed value from a closing destination
//!   to the channel that asked for it, exactly once
//! - **Flows** (`flow`) chain result-producing steps with dependency-based
//!   invalidation of cached answers
//!
//! The controller is single-threaded. Other threads post work through a
//! [`NavigationSender`].

mod active;
mod binding;
mod config;
mod container;
mod context;
mod controller;
mod dispatch;
mod error;
mod flow;
mod instruction;
mod interceptor;
mod plugin;
mod result;
mod sender;

pub use active::ActiveChildTracker;
pub use binding::{
    Binding, BindingRegistry, DestinationFactory, SyntheticAction, SyntheticRequest,
};
pub use config::{DEFAULT_MAX_REDIRECT_DEPTH, EmptyBehavior, NavigationConfig};
pub use container::{Container, ContainerConfig, ContainerFilter};
pub use context::{ContextArena, ContextId, ContextKind, ContextNode};
pub use controller::NavigationController;
pub use dispatch::{ContainerTransition, Dispatch};
pub use error::{NavigationError, Result};
pub use flow::{FLOW_STEP, FlowInterrupt, FlowResultManager, FlowScope, FlowStepTag, StepBuilder};
pub use instruction::{NavigationCommand, NavigationInstruction};
pub use interceptor::{
    BuiltInterceptor, InterceptorBuilder, InterceptorError, InterceptorPipeline, OpenDecision,
    OpenInterceptor, Outcome, PendingOpen, PendingTransition, SideEffect, TransitionDecision,
    TransitionInterceptor,
};
pub use plugin::NavigationPlugin;
pub use result::{
    NavigationResult, RESULT_CHANNEL, ResultChannel, ResultHandler, ResultManager,
};
pub use sender::NavigationSender;
