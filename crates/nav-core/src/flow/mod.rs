//! Multi-step result flows.
//!
//! A flow is a closure over a [`FlowScope`] that asks for one step result
//! after another and builds a final value from them:
//!
//! ```ignore
//! controller.register_flow(flow_id, container, |scope| {
//!     let name = scope.step("name", &AskName).get()?;
//!     let plan = scope.step("plan", &ChoosePlan).depends_on(&name).get()?;
//!     Ok(Signup { name, plan })
//! }, on_signup)?;
//! ```
//!
//! Each evaluation runs the closure from the top. A step with a cached
//! result returns it; the first step without one suspends the flow, and
//! every step reached so far is shown in the flow's container. A cached
//! result is dropped when the step's dependency fingerprint changes, so
//! changing an earlier answer re-prompts exactly the steps that used it.

mod manager;
mod runner;
mod scope;

use nav_model::{FlowId, MetadataKey, ModelError, StepId};
use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

pub use manager::FlowResultManager;
pub(crate) use runner::{FlowEntry, FlowStatus, FlowStepInterceptor, StepBack};
pub use scope::{FlowScope, StepBuilder};

/// Instance metadata marking an instance as the materialized step of a flow.
pub const FLOW_STEP: MetadataKey<FlowStepTag> = MetadataKey::new("nav.flow_step");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStepTag {
    pub flow: FlowId,
    pub step: StepId,
}

/// Why a flow evaluation stopped before producing its value.
#[derive(Debug)]
pub enum FlowInterrupt {
    /// A step is waiting for its result.
    Suspended,
    /// The flow definition is broken.
    Failed(NavigationError),
}

impl From<NavigationError> for FlowInterrupt {
    fn from(error: NavigationError) -> Self {
        Self::Failed(error)
    }
}

impl From<ModelError> for FlowInterrupt {
    fn from(error: ModelError) -> Self {
        Self::Failed(error.into())
    }
}
