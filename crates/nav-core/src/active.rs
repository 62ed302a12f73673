//! Active-child resolution.
//!
//! Every navigation root and every destination context that hosts
//! containers tracks which one of its children is active. Children move
//! through three states:
//!
//! ```text
//! unregistered -> registered (hidden) -> registered (visible)
//! ```
//!
//! and the active child is recomputed after each registration, visibility,
//! or selection event:
//!
//! 1. An explicit selection of a registered child always wins. It is
//!    forgotten when that child is unregistered or reported hidden.
//! 2. Otherwise the current active child stays active while it is visible.
//! 3. Otherwise the first visible child in registration order.
//! 4. Otherwise the first registered child.
//! 5. With no children, nothing is active.
//!
//! Registering a child only resolves when nothing is active, so the first
//! child of an empty parent becomes active and later registrations never
//! steal it.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Tracks registered children, their visibility, and the resolved active child.
#[derive(Debug, Clone)]
pub struct ActiveChildTracker<K> {
    registered: Vec<K>,
    visible: HashSet<K>,
    explicit: Option<K>,
    active: Option<K>,
}

impl<K> Default for ActiveChildTracker<K> {
    fn default() -> Self {
        Self {
            registered: Vec::new(),
            visible: HashSet::new(),
            explicit: None,
            active: None,
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> ActiveChildTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&K> {
        self.active.as_ref()
    }

    pub fn explicit(&self) -> Option<&K> {
        self.explicit.as_ref()
    }

    /// Children in registration order.
    pub fn registered(&self) -> &[K] {
        &self.registered
    }

    pub fn is_registered(&self, child: &K) -> bool {
        self.registered.contains(child)
    }

    pub fn is_visible(&self, child: &K) -> bool {
        self.visible.contains(child)
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Register a child. Returns whether the active child changed.
    pub fn register(&mut self, child: K) -> bool {
        if self.is_registered(&child) {
            return false;
        }
        self.registered.push(child);
        if self.active.is_none() {
            return self.resolve();
        }
        false
    }

    /// Unregister a child. Returns whether the active child changed.
    pub fn unregister(&mut self, child: &K) -> bool {
        let Some(index) = self.registered.iter().position(|existing| existing == child) else {
            return false;
        };
        self.registered.remove(index);
        self.visible.remove(child);
        if self.explicit.as_ref() == Some(child) {
            self.explicit = None;
        }
        if self.active.as_ref() == Some(child) {
            self.active = None;
            return self.resolve();
        }
        false
    }

    /// Record a visibility report. Reports for unregistered children are
    /// ignored. Returns whether the active child changed.
    pub fn set_visibility(&mut self, child: &K, visible: bool) -> bool {
        if !self.apply_visibility(child, visible) {
            return false;
        }
        self.resolve()
    }

    /// Apply several visibility reports and resolve once.
    ///
    /// Ties between children that become visible together go to the first
    /// one in registration order, regardless of report order.
    pub fn set_visibilities<'a, I>(&mut self, changes: I) -> bool
    where
        I: IntoIterator<Item = (&'a K, bool)>,
        K: 'a,
    {
        let mut applied = false;
        for (child, visible) in changes {
            applied |= self.apply_visibility(child, visible);
        }
        if !applied {
            return false;
        }
        self.resolve()
    }

    /// Explicitly select a child. Selecting an unregistered child is ignored.
    /// Returns whether the active child changed.
    pub fn set_active(&mut self, child: &K) -> bool {
        if !self.is_registered(child) {
            tracing::warn!(child = ?child, "Ignoring selection of unregistered child");
            return false;
        }
        self.explicit = Some(child.clone());
        self.resolve()
    }

    fn apply_visibility(&mut self, child: &K, visible: bool) -> bool {
        if !self.is_registered(child) {
            tracing::warn!(child = ?child, visible, "Ignoring visibility of unregistered child");
            return false;
        }
        if visible {
            self.visible.insert(child.clone());
        } else {
            self.visible.remove(child);
            if self.explicit.as_ref() == Some(child) {
                self.explicit = None;
            }
        }
        true
    }

    fn resolve(&mut self) -> bool {
        let resolved = self
            .explicit
            .clone()
            .filter(|child| self.is_registered(child))
            .or_else(|| {
                self.active
                    .clone()
                    .filter(|child| self.is_registered(child) && self.is_visible(child))
            })
            .or_else(|| {
                self.registered
                    .iter()
                    .find(|child| self.visible.contains(*child))
                    .cloned()
            })
            .or_else(|| self.registered.first().cloned());

        if resolved == self.active {
            return false;
        }
        tracing::trace!(from = ?self.active, to = ?resolved, "Active child changed");
        self.active = resolved;
        true
    }
}
