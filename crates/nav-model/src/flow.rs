//! Flow step data: dependency fingerprints and cached step results.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ModelError, Result};
use crate::result::ResultPayload;

/// SHA-256 fingerprint of the inputs a flow step depends on.
///
/// Values are encoded as a JSON array before hashing. JSON object keys are
/// emitted in sorted order, so equal inputs always produce equal hashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyHash(String);

impl DependencyHash {
    /// Fingerprint of a step with no declared dependencies.
    pub fn none() -> Self {
        Self::of_values(&[])
    }

    /// Fingerprint a list of serializable dependencies.
    pub fn of<V: Serialize + ?Sized>(dependencies: &V) -> Result<Self> {
        let bytes =
            serde_json::to_vec(dependencies).map_err(|source| ModelError::PayloadEncode {
                kind: "flow dependency".to_string(),
                source,
            })?;
        Ok(Self::digest(&bytes))
    }

    /// Fingerprint already encoded dependency values.
    pub fn of_values(values: &[serde_json::Value]) -> Self {
        let encoded = serde_json::Value::Array(values.to_vec()).to_string();
        Self::digest(encoded.as_bytes())
    }

    fn digest(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached step result together with the fingerprint it was computed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedStepResult {
    pub result: ResultPayload,
    pub depends_on: DependencyHash,
}
