//! Snapshot types.
//!
//! Every field carries `#[serde(default)]`: a key missing from saved state
//! decodes as absent, which is the only compatibility rule snapshots follow.

mod container;
mod flow;
mod snapshot;

pub use container::ContainerSnapshot;
pub use flow::FlowResultsSnapshot;
pub use snapshot::NavigationSnapshot;
