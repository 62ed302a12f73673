//! Navigation data model.
//!
//! This crate holds the value types the navigation core operates on:
//!
//! - **Descriptors** (`descriptor`): the kind, capabilities, and payload of a
//!   destination, plus the [`Destination`] / [`WithResult`] traits typed code
//!   implements
//! - **Instances** (`instance`): a stable-identity instantiation of a
//!   descriptor carrying runtime metadata
//! - **Backstacks** (`backstack`): ordered, duplicate-free history for one
//!   navigation scope, changed only by wholesale replacement
//! - **Transitions** (`transition`): the opened/closed/retained diff between
//!   two backstacks
//! - **Metadata** (`metadata`): a typed key/value store
//! - **Results and flow steps** (`result`, `flow`): correlation ids, tagged
//!   result payloads, and dependency fingerprints
//!
//! Nothing here performs navigation; see `nav-core` for the state machine.

mod backstack;
mod descriptor;
mod error;
mod flow;
mod ids;
mod instance;
mod metadata;
mod result;
mod transition;

pub use backstack::Backstack;
pub use descriptor::{
    Capabilities, Descriptor, Destination, NavigationDirection, WithResult, result_type_name,
};
pub use error::{ModelError, Result};
pub use flow::{CachedStepResult, DependencyHash};
pub use ids::{ContainerKey, DescriptorId, FlowId, InstanceId, StepId};
pub use instance::DestinationInstance;
pub use metadata::{Metadata, MetadataKey};
pub use result::{PendingOutcome, PendingResult, ResultChannelId, ResultPayload};
pub use transition::Transition;
