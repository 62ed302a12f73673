//! Encoding and file I/O for snapshots.
//!
//! This module handles:
//! - Encoding snapshots to the opaque bytes a host stores
//! - Saving snapshot files with atomic writes
//! - Loading snapshot files

mod codec;
mod load;
mod save;

pub use codec::{decode_snapshot, encode_snapshot};
pub use load::load_snapshot;
pub use save::save_snapshot;
