//! Result correlation types.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::descriptor::result_type_name;
use crate::error::{ModelError, Result};
use crate::ids::InstanceId;

/// Correlation key between a result-producing destination and its requester.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultChannelId {
    /// Instance that asked for the result.
    pub owner: InstanceId,
    /// Requester-chosen name, unique per owner.
    pub result_id: String,
}

impl ResultChannelId {
    pub fn new(owner: InstanceId, result_id: impl Into<String>) -> Self {
        Self {
            owner,
            result_id: result_id.into(),
        }
    }
}

impl fmt::Display for ResultChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.result_id)
    }
}

/// An encoded result value tagged with the name of its Rust type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    type_name: String,
    value: serde_json::Value,
}

impl ResultPayload {
    pub fn new<T: Serialize>(value: &T) -> Result<Self> {
        let type_name = result_type_name::<T>();
        let value = serde_json::to_value(value).map_err(|source| ModelError::PayloadEncode {
            kind: type_name.to_string(),
            source,
        })?;
        Ok(Self {
            type_name: type_name.to_string(),
            value,
        })
    }

    /// Build a payload from an already encoded value.
    pub fn from_parts(type_name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    pub fn is<T>(&self) -> bool {
        self.type_name == result_type_name::<T>()
    }

    /// Decode as `T`. A payload written with another type is rejected, not coerced.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.is::<T>() {
            return Err(ModelError::ResultTypeMismatch {
                expected: result_type_name::<T>().to_string(),
                found: self.type_name.clone(),
            });
        }
        serde_json::from_value(self.value.clone()).map_err(|source| ModelError::PayloadDecode {
            kind: self.type_name.clone(),
            source,
        })
    }
}

/// What a closing result-producing destination left behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingOutcome {
    /// Closed without producing a value.
    Closed,
    /// Completed with a value.
    Result { payload: ResultPayload },
}

impl PendingOutcome {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn payload(&self) -> Option<&ResultPayload> {
        match self {
            Self::Closed => None,
            Self::Result { payload } => Some(payload),
        }
    }
}

/// A result waiting to be delivered to its channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingResult {
    pub channel: ResultChannelId,
    pub outcome: PendingOutcome,
}
