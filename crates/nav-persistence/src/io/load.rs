//! Snapshot loading.

use std::fs;
use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::io::codec::decode_snapshot;
use crate::types::NavigationSnapshot;

/// Load a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<NavigationSnapshot> {
    let bytes = fs::read(path).map_err(PersistenceError::io("read", path))?;

    let snapshot = decode_snapshot(&bytes)?;
    tracing::debug!("Loaded navigation snapshot from {}", path.display());
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("missing.json"));
        assert!(matches!(
            result,
            Err(PersistenceError::Io {
                operation: "read",
                ..
            })
        ));
    }
}
