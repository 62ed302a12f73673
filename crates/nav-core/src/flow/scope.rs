//! The step API flows are written against.

use std::marker::PhantomData;

use nav_model::{
    DependencyHash, Descriptor, FlowId, ModelError, ResultPayload, StepId, WithResult,
};
use serde::Serialize;

use super::{FlowInterrupt, FlowResultManager};
use crate::error::NavigationError;

/// A step the current evaluation got to, answered or not.
#[derive(Debug, Clone)]
pub(crate) struct ReachedStep {
    pub(crate) step: StepId,
    pub(crate) descriptor: Descriptor,
    pub(crate) depends_on: DependencyHash,
}

/// One evaluation of a flow.
pub struct FlowScope<'a> {
    flow: &'a FlowId,
    manager: &'a mut FlowResultManager,
    reached: Vec<ReachedStep>,
}

impl<'a> FlowScope<'a> {
    pub(crate) fn new(flow: &'a FlowId, manager: &'a mut FlowResultManager) -> Self {
        Self {
            flow,
            manager,
            reached: Vec::new(),
        }
    }

    pub fn flow_id(&self) -> &FlowId {
        self.flow
    }

    /// Declare the next step. Nothing is evaluated until [`StepBuilder::get`].
    pub fn step<'s, D: WithResult>(
        &'s mut self,
        id: &str,
        destination: &D,
    ) -> StepBuilder<'s, 'a, D> {
        StepBuilder {
            scope: self,
            id: id.to_string(),
            descriptor: Descriptor::of_with_result(destination),
            dependencies: Vec::new(),
            default: None,
            transient: false,
            error: None,
            _destination: PhantomData,
        }
    }

    pub(crate) fn into_reached(self) -> Vec<ReachedStep> {
        self.reached
    }
}

/// Options for one step, finished with [`StepBuilder::get`].
pub struct StepBuilder<'s, 'a, D: WithResult> {
    scope: &'s mut FlowScope<'a>,
    id: String,
    descriptor: nav_model::Result<Descriptor>,
    dependencies: Vec<serde_json::Value>,
    default: Option<D::Output>,
    transient: bool,
    error: Option<ModelError>,
    _destination: PhantomData<fn() -> D>,
}

impl<D: WithResult> StepBuilder<'_, '_, D> {
    /// Add a value the step's result depends on. When it changes between
    /// evaluations, the cached result is discarded.
    #[must_use]
    pub fn depends_on<V: Serialize + ?Sized>(mut self, value: &V) -> Self {
        match serde_json::to_value(value) {
            Ok(encoded) => self.dependencies.push(encoded),
            Err(source) => {
                self.error.get_or_insert(ModelError::PayloadEncode {
                    kind: format!("dependency of step '{}'", self.id),
                    source,
                });
            }
        }
        self
    }

    /// Result to use until the step is answered. Applied once per step.
    #[must_use]
    pub fn default(mut self, value: D::Output) -> Self {
        self.default = Some(value);
        self
    }

    /// Never save this step's result.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// The step's result, or [`FlowInterrupt::Suspended`] while it is unanswered.
    pub fn get(self) -> Result<D::Output, FlowInterrupt> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let descriptor = self.descriptor?;
        let step = StepId::new(self.id)?;
        let scope = self.scope;
        if scope.reached.iter().any(|reached| reached.step == step) {
            return Err(FlowInterrupt::Failed(NavigationError::DuplicateFlowStep {
                flow: scope.flow.clone(),
                step,
            }));
        }

        let depends_on = DependencyHash::of_values(&self.dependencies);
        if self.transient {
            scope.manager.mark_transient(step.clone());
        }
        if let Some(default) = self.default {
            let payload = ResultPayload::new(&default)?;
            scope
                .manager
                .set_default(step.clone(), payload, depends_on.clone());
        }

        let cached = scope.manager.get(&step, &depends_on).cloned();
        scope.reached.push(ReachedStep {
            step,
            descriptor,
            depends_on,
        });
        match cached {
            Some(payload) => Ok(payload.decode::<D::Output>()?),
            None => Err(FlowInterrupt::Suspended),
        }
    }
}
