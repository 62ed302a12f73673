//! Destination bindings.
//!
//! Every destination kind that can be opened must be bound at startup. A
//! binding is either a screen (a factory the host renderer calls to build
//! whatever it draws for an instance) or synthetic (an action that runs on
//! open and never adds an instance to a backstack).

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use nav_model::{Destination, DescriptorId, DestinationInstance};

use crate::context::ContextId;
use crate::controller::NavigationController;
use crate::error::{NavigationError, Result};

/// Builds the host-side object for a screen instance.
pub trait DestinationFactory {
    fn create(&self, instance: &DestinationInstance) -> Result<Box<dyn Any>>;
}

impl<F> DestinationFactory for F
where
    F: Fn(&DestinationInstance) -> Result<Box<dyn Any>>,
{
    fn create(&self, instance: &DestinationInstance) -> Result<Box<dyn Any>> {
        self(instance)
    }
}

/// Context handed to a synthetic destination's action.
#[derive(Debug, Clone)]
pub struct SyntheticRequest {
    pub from: ContextId,
    pub instance: DestinationInstance,
}

pub type SyntheticAction = Rc<dyn Fn(&mut NavigationController, &SyntheticRequest) -> Result<()>>;

#[derive(Clone)]
pub enum Binding {
    Screen(Rc<dyn DestinationFactory>),
    Synthetic(SyntheticAction),
}

impl Binding {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Screen(_) => f.write_str("Screen(..)"),
            Self::Synthetic(_) => f.write_str("Synthetic(..)"),
        }
    }
}

/// Closed map from destination kind to binding.
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    bindings: HashMap<DescriptorId, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: DescriptorId, binding: Binding) -> Result<()> {
        if self.bindings.contains_key(&descriptor) {
            return Err(NavigationError::DuplicateBinding { descriptor });
        }
        tracing::debug!(
            descriptor = %descriptor,
            synthetic = binding.is_synthetic(),
            "Registered destination binding"
        );
        self.bindings.insert(descriptor, binding);
        Ok(())
    }

    pub fn register_screen<F>(&mut self, descriptor: DescriptorId, factory: F) -> Result<()>
    where
        F: DestinationFactory + 'static,
    {
        self.register(descriptor, Binding::Screen(Rc::new(factory)))
    }

    pub fn register_synthetic<F>(&mut self, descriptor: DescriptorId, action: F) -> Result<()>
    where
        F: Fn(&mut NavigationController, &SyntheticRequest) -> Result<()> + 'static,
    {
        self.register(descriptor, Binding::Synthetic(Rc::new(action)))
    }

    /// Bind a typed destination to a factory.
    pub fn screen<D, F>(&mut self, factory: F) -> Result<()>
    where
        D: Destination,
        F: DestinationFactory + 'static,
    {
        self.register_screen(D::descriptor_id(), factory)
    }

    /// Bind a typed destination to a synthetic action.
    pub fn synthetic<D, F>(&mut self, action: F) -> Result<()>
    where
        D: Destination,
        F: Fn(&mut NavigationController, &SyntheticRequest) -> Result<()> + 'static,
    {
        self.register_synthetic(D::descriptor_id(), action)
    }

    pub fn get(&self, descriptor: &DescriptorId) -> Option<&Binding> {
        self.bindings.get(descriptor)
    }

    /// Binding for `descriptor`, or [`NavigationError::MissingBinding`].
    pub fn require(&self, descriptor: &DescriptorId) -> Result<&Binding> {
        self.get(descriptor)
            .ok_or_else(|| NavigationError::MissingBinding {
                descriptor: descriptor.clone(),
            })
    }

    pub fn contains(&self, descriptor: &DescriptorId) -> bool {
        self.bindings.contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
