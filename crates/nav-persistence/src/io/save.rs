//! Snapshot saving.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::io::codec::encode_snapshot;
use crate::types::NavigationSnapshot;

/// Save a snapshot file.
///
/// Writes a sibling `.tmp` file and renames it over `path`, so a crash
/// mid-save leaves the previous snapshot intact.
pub fn save_snapshot(snapshot: &NavigationSnapshot, path: &Path) -> Result<()> {
    let bytes = encode_snapshot(snapshot)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(PersistenceError::io("create directory", parent))?;
    }

    let temp_path = path.with_extension("tmp");
    let written = write_synced(&temp_path, &bytes).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|source| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source,
        })
    });
    if let Err(error) = written {
        discard_temp(&temp_path);
        return Err(error);
    }

    tracing::debug!(
        containers = snapshot.containers.len(),
        pending_results = snapshot.pending_results.len(),
        flows = snapshot.flows.len(),
        "Saved navigation snapshot to {}",
        path.display()
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(PersistenceError::io("create", path))?;
    file.write_all(bytes).map_err(PersistenceError::io("write", path))?;
    file.sync_all().map_err(PersistenceError::io("sync", path))
}

fn discard_temp(path: &Path) {
    if path.exists() {
        if let Err(error) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %error, "Could not remove partial snapshot");
        }
    }
}
