//! Snapshot byte encoding.

use crate::error::{PersistenceError, Result};
use crate::types::NavigationSnapshot;

/// Encode a snapshot as JSON bytes.
pub fn encode_snapshot(snapshot: &NavigationSnapshot) -> Result<Vec<u8>> {
    serde_json::to_vec(snapshot).map_err(|source| PersistenceError::Serialization { source })
}

/// Decode snapshot bytes. Missing keys decode as empty.
pub fn decode_snapshot(bytes: &[u8]) -> Result<NavigationSnapshot> {
    serde_json::from_slice(bytes).map_err(|source| PersistenceError::Deserialization { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_empty_snapshot() {
        let snapshot = decode_snapshot(b"{}").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let snapshot = decode_snapshot(br#"{"containers": {}, "future_field": 1}"#).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode_snapshot(b"not json"),
            Err(PersistenceError::Deserialization { .. })
        ));
    }
}
