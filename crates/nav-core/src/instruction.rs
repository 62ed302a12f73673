//! Navigation instructions.

use std::fmt;

use nav_model::{
    Backstack, ContainerKey, Descriptor, DestinationInstance, InstanceId, NavigationDirection,
    ResultPayload,
};
use serde::Serialize;

use crate::context::ContextId;
use crate::error::Result;

/// A requested navigation mutation. Every change to a backstack is
/// expressed as one of these and passes through the interceptor pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationInstruction {
    /// Place `instance` in a container reachable from `from`.
    Open {
        from: ContextId,
        instance: DestinationInstance,
    },
    /// Remove an instance from whichever backstack holds it.
    Close { id: InstanceId },
    /// Remove an instance and hand `payload` to whoever requested it.
    CloseWithResult {
        id: InstanceId,
        payload: ResultPayload,
    },
    /// Replace a container's backstack wholesale.
    SetBackstack {
        container: ContainerKey,
        backstack: Backstack,
    },
}

impl NavigationInstruction {
    pub fn open(from: ContextId, instance: DestinationInstance) -> Self {
        Self::Open { from, instance }
    }

    pub fn push(from: ContextId, descriptor: Descriptor) -> Self {
        Self::open(
            from,
            DestinationInstance::new(descriptor, NavigationDirection::Push),
        )
    }

    pub fn present(from: ContextId, descriptor: Descriptor) -> Self {
        Self::open(
            from,
            DestinationInstance::new(descriptor, NavigationDirection::Present),
        )
    }

    pub fn close(id: InstanceId) -> Self {
        Self::Close { id }
    }

    pub fn close_with_result<T: Serialize>(id: InstanceId, value: &T) -> Result<Self> {
        Ok(Self::CloseWithResult {
            id,
            payload: ResultPayload::new(value)?,
        })
    }

    pub fn set_backstack(container: ContainerKey, backstack: Backstack) -> Self {
        Self::SetBackstack {
            container,
            backstack,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Close { .. } => "close",
            Self::CloseWithResult { .. } => "close_with_result",
            Self::SetBackstack { .. } => "set_backstack",
        }
    }

    /// Id of the instance being closed, for close instructions.
    pub fn closing(&self) -> Option<&InstanceId> {
        match self {
            Self::Close { id } | Self::CloseWithResult { id, .. } => Some(id),
            Self::Open { .. } | Self::SetBackstack { .. } => None,
        }
    }
}

impl fmt::Display for NavigationInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { from, instance } => write!(
                f,
                "{} of '{}' from {from}",
                instance.direction().name(),
                instance.descriptor().id()
            ),
            Self::Close { id } => write!(f, "close of {id}"),
            Self::CloseWithResult { id, payload } => {
                write!(f, "close of {id} with {}", payload.type_name())
            }
            Self::SetBackstack {
                container,
                backstack,
            } => write!(f, "set_backstack of '{container}' ({} entries)", backstack.len()),
        }
    }
}

/// Work posted to a controller from another thread through a
/// [`NavigationSender`](crate::NavigationSender).
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationCommand {
    Instruction(NavigationInstruction),
    ContainerVisibility { container: ContainerKey, visible: bool },
    SelectContainer { container: ContainerKey },
}

impl From<NavigationInstruction> for NavigationCommand {
    fn from(instruction: NavigationInstruction) -> Self {
        Self::Instruction(instruction)
    }
}
