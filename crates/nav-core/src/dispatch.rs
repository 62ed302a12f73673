//! What a dispatch did.

use nav_model::{ContainerKey, Transition};

/// A transition committed to one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTransition {
    pub container: ContainerKey,
    pub transition: Transition,
}

/// Transitions committed while handling one instruction, in commit order.
///
/// Follow-up work (redirects, side effects, parents closed by an emptied
/// container) is folded into the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    transitions: Vec<ContainerTransition>,
    cancelled: bool,
}

impl Dispatch {
    pub(crate) fn committed(container: ContainerKey, transition: Transition) -> Self {
        Self {
            transitions: vec![ContainerTransition {
                container,
                transition,
            }],
            cancelled: false,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self {
            transitions: Vec::new(),
            cancelled: true,
        }
    }

    pub(crate) fn merge(&mut self, other: Dispatch) {
        self.transitions.extend(other.transitions);
        self.cancelled |= other.cancelled;
    }

    pub fn transitions(&self) -> &[ContainerTransition] {
        &self.transitions
    }

    /// Last transition committed to `container`.
    pub fn for_container(&self, container: &ContainerKey) -> Option<&Transition> {
        self.transitions
            .iter()
            .rev()
            .find(|committed| &committed.container == container)
            .map(|committed| &committed.transition)
    }

    /// Whether an interceptor cancelled some part of the dispatch.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether no backstack changed.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
