//! Saved state for the navigation core.
//!
//! The core treats saved state as an opaque encode/decode pair: the host
//! stores the bytes through its own state-saving facility and hands them
//! back when the process is recreated.
//!
//! # Layout
//!
//! ```text
//! {
//!   "containers": { "<key>": { "backstack": [id, ...], "instances": { id: instance } } },
//!   "pending_results": [ { "channel": ..., "outcome": ... } ],
//!   "flows": {
//!     "<flow>": {
//!       "results": { step: { result, depends_on } },
//!       "defaults_initialized": [step]
//!     }
//!   }
//! }
//! ```
//!
//! There is no schema version; a missing key decodes as absent.

mod error;
mod io;
mod types;

pub use error::{PersistenceError, Result};
pub use io::{decode_snapshot, encode_snapshot, load_snapshot, save_snapshot};
pub use types::{ContainerSnapshot, FlowResultsSnapshot, NavigationSnapshot};
