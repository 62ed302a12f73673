//! Posting navigation work from other threads.
//!
//! The controller is single-threaded: every backstack mutation, interceptor
//! run, and active-child resolution happens on the thread that owns it.
//! Other threads hold a [`NavigationSender`] and post commands; the owning
//! thread applies them in order with
//! [`NavigationController::process_pending`](crate::NavigationController::process_pending).

use crossbeam_channel::Sender;
use nav_model::ContainerKey;

use crate::error::{NavigationError, Result};
use crate::instruction::{NavigationCommand, NavigationInstruction};

/// Cloneable, thread-safe handle for queueing commands on a controller.
#[derive(Debug, Clone)]
pub struct NavigationSender {
    sender: Sender<NavigationCommand>,
}

impl NavigationSender {
    pub(crate) fn new(sender: Sender<NavigationCommand>) -> Self {
        Self { sender }
    }

    pub fn send(&self, command: impl Into<NavigationCommand>) -> Result<()> {
        self.sender
            .send(command.into())
            .map_err(|_| NavigationError::ControllerDropped)
    }

    pub fn dispatch(&self, instruction: NavigationInstruction) -> Result<()> {
        self.send(instruction)
    }

    pub fn set_container_visibility(&self, container: ContainerKey, visible: bool) -> Result<()> {
        self.send(NavigationCommand::ContainerVisibility { container, visible })
    }

    pub fn select_container(&self, container: ContainerKey) -> Result<()> {
        self.send(NavigationCommand::SelectContainer { container })
    }
}
