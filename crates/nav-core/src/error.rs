//! Navigation error types.
//!
//! Benign absence (closing an id that is not on any backstack, a result with
//! nobody waiting for it, a container with no active child) never produces
//! one of these. Everything here is either a contract violation at a
//! registration or call site, or an I/O failure while loading configuration
//! or saved state.

use std::path::PathBuf;

use nav_model::{ContainerKey, DescriptorId, FlowId, ModelError, NavigationDirection, StepId};
use nav_persistence::PersistenceError;
use thiserror::Error;

use crate::context::ContextId;
use crate::interceptor::InterceptorError;

/// Errors raised by the navigation controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NavigationError {
    // =========================================================================
    // REGISTRATION
    // =========================================================================
    /// No binding is registered for the destination kind.
    #[error("no binding registered for destination '{descriptor}'")]
    MissingBinding { descriptor: DescriptorId },

    /// A binding was registered twice for the same kind.
    #[error("destination '{descriptor}' is already bound")]
    DuplicateBinding { descriptor: DescriptorId },

    /// The binding exists but cannot produce a renderable destination.
    #[error("destination '{descriptor}' is synthetic and cannot be rendered")]
    NotRenderable { descriptor: DescriptorId },

    /// A container key is already in use.
    #[error("container '{container}' already exists")]
    DuplicateContainer { container: ContainerKey },

    /// A flow id is already in use.
    #[error("flow '{flow}' is already registered")]
    DuplicateFlow { flow: FlowId },

    /// A flow declared the same step twice in one evaluation.
    #[error("flow '{flow}' declares step '{step}' more than once")]
    DuplicateFlowStep { flow: FlowId, step: StepId },

    /// A result channel is already registered under this id.
    #[error("result channel '{channel}' is already registered")]
    DuplicateResultChannel { channel: String },

    // =========================================================================
    // LOOKUP
    // =========================================================================
    /// The container key does not name a live container.
    #[error("unknown container '{container}'")]
    UnknownContainer { container: ContainerKey },

    /// The context id does not name a live context.
    #[error("unknown navigation context {context}")]
    UnknownContext { context: ContextId },

    // =========================================================================
    // DISPATCH
    // =========================================================================
    /// The destination was opened with a direction it does not declare.
    #[error("destination '{descriptor}' does not support {} navigation", .direction.name())]
    UnsupportedDirection {
        descriptor: DescriptorId,
        direction: NavigationDirection,
    },

    /// No container accepted the instruction (strict mode only).
    #[error("no container accepted {instruction}")]
    UnhandledInstruction { instruction: String },

    /// Open interceptors kept redirecting.
    #[error("open redirected more than {limit} times")]
    RedirectLoop { limit: usize },

    /// An interceptor failed unexpectedly.
    #[error("interceptor '{name}' failed")]
    Interceptor {
        name: String,
        #[source]
        source: InterceptorError,
    },

    /// A result value does not have the type its destination declares.
    #[error("result type mismatch: expected '{expected}', found '{found}'")]
    ResultTypeMismatch { expected: String, found: String },

    /// Model value could not be built or decoded.
    #[error(transparent)]
    Model(ModelError),

    // =========================================================================
    // I/O
    // =========================================================================
    /// Configuration file could not be read.
    #[error("Failed to read navigation config: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::NavigationConfig`].
    #[error("Invalid navigation config: {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Saved state could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The controller owning the command queue has been dropped.
    #[error("navigation controller is no longer running")]
    ControllerDropped,
}

impl NavigationError {
    /// Whether this error is a programming error at a registration or call
    /// site, as opposed to an I/O failure.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::Persistence(_)
                | Self::ControllerDropped
        )
    }

    pub(crate) fn interceptor(name: &str, source: InterceptorError) -> Self {
        Self::Interceptor {
            name: name.to_string(),
            source,
        }
    }
}

impl From<ModelError> for NavigationError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::ResultTypeMismatch { expected, found } => {
                Self::ResultTypeMismatch { expected, found }
            }
            other => Self::Model(other),
        }
    }
}

/// Result type alias for navigation operations.
pub type Result<T> = std::result::Result<T, NavigationError>;
