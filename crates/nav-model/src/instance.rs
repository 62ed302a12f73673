//! Destination instances.

use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, NavigationDirection};
use crate::error::Result;
use crate::ids::InstanceId;
use crate::metadata::{Metadata, MetadataKey};

/// One stable-identity instantiation of a [`Descriptor`].
///
/// Equality and hashing use the id only: two instances with the same id are
/// the same place in history even if their metadata has since diverged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationInstance {
    id: InstanceId,
    descriptor: Descriptor,
    direction: NavigationDirection,
    #[serde(default)]
    metadata: Metadata,
}

impl DestinationInstance {
    /// Create an instance with a freshly generated id.
    pub fn new(descriptor: Descriptor, direction: NavigationDirection) -> Self {
        Self::with_id(InstanceId::generate(), descriptor, direction)
    }

    pub fn with_id(id: InstanceId, descriptor: Descriptor, direction: NavigationDirection) -> Self {
        Self {
            id,
            descriptor,
            direction,
            metadata: Metadata::new(),
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn direction(&self) -> NavigationDirection {
        self.direction
    }

    /// Runtime metadata attached to this instance.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access to runtime metadata. The id is unaffected.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Builder form of setting a runtime metadata entry.
    pub fn with_metadata<V: Serialize>(mut self, key: &MetadataKey<V>, value: V) -> Result<Self> {
        self.metadata.set(key, value)?;
        Ok(self)
    }

    /// Look a key up on the instance first, then on the descriptor's
    /// declared metadata.
    pub fn lookup<V: DeserializeOwned>(&self, key: &MetadataKey<V>) -> Option<V> {
        self.metadata
            .get(key)
            .or_else(|| self.descriptor.metadata().get(key))
    }
}

impl PartialEq for DestinationInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DestinationInstance {}

impl Hash for DestinationInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
