//! Observers notified after commits.

use nav_model::{ContainerKey, DestinationInstance};

/// Receives committed navigation changes. Plugins observe; they cannot veto
/// (use an interceptor for that).
pub trait NavigationPlugin {
    fn name(&self) -> &str;

    /// `instance` entered `container`'s backstack.
    fn on_opened(&mut self, _container: &ContainerKey, _instance: &DestinationInstance) {}

    /// `instance` left `container`'s backstack.
    fn on_closed(&mut self, _container: &ContainerKey, _instance: &DestinationInstance) {}

    /// The top of `container`'s backstack changed.
    fn on_active(&mut self, _container: &ContainerKey, _instance: Option<&DestinationInstance>) {}
}
