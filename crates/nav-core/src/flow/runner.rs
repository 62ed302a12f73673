//! Live flows and the interceptor that routes step closes back to them.

use nav_model::{
    Backstack, ContainerKey, DependencyHash, DestinationInstance, FlowId, NavigationDirection,
    ResultPayload, StepId,
};

use super::scope::ReachedStep;
use super::{FLOW_STEP, FlowInterrupt, FlowResultManager, FlowScope, FlowStepTag};
use crate::error::Result;
use crate::interceptor::{
    InterceptorError, Outcome, PendingTransition, SideEffect, TransitionInterceptor,
};
use crate::result::NavigationResult;

pub(crate) enum FlowStatus {
    Suspended,
    Completed,
}

/// What closing a step without a result does to its flow.
pub(crate) enum StepBack {
    /// The first step was closed: the flow is abandoned.
    Cancel,
    /// Earlier results were cleared; evaluate again.
    Resume,
}

/// A flow with its value and callback types erased.
trait ErasedFlow {
    fn evaluate(&mut self, scope: &mut FlowScope<'_>) -> Result<FlowStatus>;
    /// Hand the completed value to the callback.
    fn finish(&mut self);
    /// Tell the callback the flow was abandoned.
    fn cancel(&mut self);
}

struct TypedFlow<T, F, C> {
    runner: F,
    on_finish: C,
    completed: Option<T>,
}

impl<T, F, C> ErasedFlow for TypedFlow<T, F, C>
where
    F: Fn(&mut FlowScope<'_>) -> std::result::Result<T, FlowInterrupt>,
    C: FnMut(NavigationResult<T>),
{
    fn evaluate(&mut self, scope: &mut FlowScope<'_>) -> Result<FlowStatus> {
        match (self.runner)(scope) {
            Ok(value) => {
                self.completed = Some(value);
                Ok(FlowStatus::Completed)
            }
            Err(FlowInterrupt::Suspended) => Ok(FlowStatus::Suspended),
            Err(FlowInterrupt::Failed(error)) => Err(error),
        }
    }

    fn finish(&mut self) {
        if let Some(value) = self.completed.take() {
            (self.on_finish)(NavigationResult::Completed(value));
        }
    }

    fn cancel(&mut self) {
        (self.on_finish)(NavigationResult::Closed);
    }
}

struct StepState {
    step: StepId,
    instance: DestinationInstance,
    depends_on: DependencyHash,
}

/// A registered flow bound to the container its steps are shown in.
pub(crate) struct FlowEntry {
    id: FlowId,
    container: ContainerKey,
    manager: FlowResultManager,
    flow: Box<dyn ErasedFlow>,
    steps: Vec<StepState>,
}

impl FlowEntry {
    pub(crate) fn new<T, F, C>(
        id: FlowId,
        container: ContainerKey,
        manager: FlowResultManager,
        runner: F,
        on_finish: C,
    ) -> Self
    where
        T: 'static,
        F: Fn(&mut FlowScope<'_>) -> std::result::Result<T, FlowInterrupt> + 'static,
        C: FnMut(NavigationResult<T>) + 'static,
    {
        Self {
            id,
            container,
            manager,
            flow: Box::new(TypedFlow {
                runner,
                on_finish,
                completed: None,
            }),
            steps: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> &FlowId {
        &self.id
    }

    pub(crate) fn container(&self) -> &ContainerKey {
        &self.container
    }

    pub(crate) fn manager(&self) -> &FlowResultManager {
        &self.manager
    }

    pub(crate) fn replace_manager(&mut self, manager: FlowResultManager) {
        self.manager = manager;
    }

    /// Take over step instances already in `backstack` (after a restore), so
    /// their ids survive the first evaluation.
    pub(crate) fn adopt(&mut self, backstack: &Backstack) {
        self.steps = backstack
            .iter()
            .filter_map(|instance| {
                let tag = instance.metadata().get(&FLOW_STEP)?;
                (tag.flow == self.id).then(|| StepState {
                    step: tag.step,
                    instance: instance.clone(),
                    depends_on: DependencyHash::none(),
                })
            })
            .collect();
    }

    /// Run the flow once and rebuild its step instances.
    pub(crate) fn evaluate(&mut self) -> Result<FlowStatus> {
        let mut scope = FlowScope::new(&self.id, &mut self.manager);
        let status = self.flow.evaluate(&mut scope);
        let reached = scope.into_reached();
        let status = status?;
        self.materialize(reached)?;
        Ok(status)
    }

    fn materialize(&mut self, reached: Vec<ReachedStep>) -> Result<()> {
        let mut steps = Vec::with_capacity(reached.len());
        for ReachedStep {
            step,
            descriptor,
            depends_on,
        } in reached
        {
            let existing = self
                .steps
                .iter()
                .position(|state| state.step == step && state.instance.descriptor() == &descriptor);
            let instance = match existing {
                Some(index) => self.steps.swap_remove(index).instance,
                None => {
                    let direction = if descriptor.supports(NavigationDirection::Push) {
                        NavigationDirection::Push
                    } else {
                        NavigationDirection::Present
                    };
                    let tag = FlowStepTag {
                        flow: self.id.clone(),
                        step: step.clone(),
                    };
                    DestinationInstance::new(descriptor, direction).with_metadata(&FLOW_STEP, tag)?
                }
            };
            steps.push(StepState {
                step,
                instance,
                depends_on,
            });
        }
        self.steps = steps;
        Ok(())
    }

    /// Step instances in flow order.
    pub(crate) fn step_instances(&self) -> impl Iterator<Item = &DestinationInstance> {
        self.steps.iter().map(|state| &state.instance)
    }

    /// Store the answer to `step` under the fingerprint it was asked with.
    pub(crate) fn record_result(&mut self, step: &StepId, payload: ResultPayload) {
        let depends_on = self
            .steps
            .iter()
            .find(|state| &state.step == step)
            .map_or_else(DependencyHash::none, |state| state.depends_on.clone());
        self.manager.set(step.clone(), payload, depends_on);
    }

    /// Go back from `step`: clear it and the step before it.
    pub(crate) fn step_back(&mut self, step: &StepId) -> StepBack {
        let Some(index) = self.steps.iter().position(|state| &state.step == step) else {
            return StepBack::Resume;
        };
        if index == 0 {
            return StepBack::Cancel;
        }
        let previous = self.steps[index - 1].step.clone();
        self.manager.clear(&previous);
        self.manager.clear(step);
        StepBack::Resume
    }

    pub(crate) fn finish(&mut self) {
        self.flow.finish();
    }

    pub(crate) fn cancel(&mut self) {
        self.flow.cancel();
    }
}

/// Turns the close of a flow step into a flow update.
///
/// Runs before every other transition interceptor. Only closes aimed at a
/// step instance are affected; the flow itself rebuilds the container's
/// backstack afterwards.
pub(crate) struct FlowStepInterceptor;

impl TransitionInterceptor for FlowStepInterceptor {
    fn name(&self) -> &str {
        "flow-steps"
    }

    fn intercept_transition(
        &self,
        pending: &PendingTransition<'_>,
    ) -> std::result::Result<Outcome<Backstack>, InterceptorError> {
        let Some(closing) = pending.cause().closing() else {
            return Ok(Outcome::Continue);
        };
        if !pending.transition().is_closing(closing) {
            return Ok(Outcome::Continue);
        }
        let Some(tag) = pending
            .transition()
            .previous()
            .get(closing)
            .and_then(|instance| instance.metadata().get(&FLOW_STEP))
        else {
            return Ok(Outcome::Continue);
        };
        let payload = pending.result_for(closing).cloned();
        let instance = closing.clone();
        Ok(Outcome::CancelAnd(SideEffect::new(move |controller| {
            controller.flow_step_closed(&tag, &instance, payload)
        })))
    }
}
