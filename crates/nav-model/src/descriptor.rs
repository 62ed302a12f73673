//! Destination descriptors.
//!
//! A [`Descriptor`] is the erased, serializable identity of "a place the user
//! can be": its kind, the capabilities the kind declares, its payload
//! (arguments), and declared metadata. Typed code describes destinations by
//! implementing [`Destination`] (and [`WithResult`] when the destination
//! produces a value) and converts them with [`Descriptor::of`] /
//! [`Descriptor::of_with_result`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::DescriptorId;
use crate::metadata::{Metadata, MetadataKey};

/// How a destination is placed on screen relative to its requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDirection {
    /// Pushed onto the requester's navigation scope.
    Push,
    /// Presented above the requester (dialogs, sheets, full-screen flows).
    Present,
}

impl NavigationDirection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Present => "present",
        }
    }
}

/// Capabilities declared by a destination kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub push: bool,
    pub present: bool,
    /// Type name of the result the destination returns, if any.
    #[serde(default)]
    pub result_type: Option<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::push_only()
    }
}

impl Capabilities {
    pub fn push_only() -> Self {
        Self {
            push: true,
            present: false,
            result_type: None,
        }
    }

    pub fn present_only() -> Self {
        Self {
            push: false,
            present: true,
            result_type: None,
        }
    }

    pub fn push_and_present() -> Self {
        Self {
            push: true,
            present: true,
            result_type: None,
        }
    }

    /// Declare that the destination returns values of type `R`.
    #[must_use]
    pub fn returning<R>(mut self) -> Self {
        self.result_type = Some(result_type_name::<R>().to_string());
        self
    }

    pub fn supports(&self, direction: NavigationDirection) -> bool {
        match direction {
            NavigationDirection::Push => self.push,
            NavigationDirection::Present => self.present,
        }
    }
}

/// Name used to tag result payloads of type `T`.
pub fn result_type_name<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// A typed destination.
pub trait Destination: Serialize + DeserializeOwned + 'static {
    /// Stable kind identifier, unique across the application.
    const KIND: &'static str;
    const SUPPORTS_PUSH: bool = true;
    const SUPPORTS_PRESENT: bool = false;

    fn descriptor_id() -> DescriptorId {
        DescriptorId::from_static(Self::KIND)
    }

    /// Direction used when the caller does not pick one.
    fn preferred_direction() -> NavigationDirection {
        if Self::SUPPORTS_PUSH {
            NavigationDirection::Push
        } else {
            NavigationDirection::Present
        }
    }
}

/// A destination that produces a result of type [`WithResult::Output`].
pub trait WithResult: Destination {
    type Output: Serialize + DeserializeOwned + 'static;
}

/// Erased identity and payload of a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    id: DescriptorId,
    capabilities: Capabilities,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default)]
    metadata: Metadata,
}

impl Descriptor {
    pub fn new(id: DescriptorId, capabilities: Capabilities, payload: serde_json::Value) -> Self {
        Self {
            id,
            capabilities,
            payload,
            metadata: Metadata::new(),
        }
    }

    /// Describe a typed destination.
    pub fn of<D: Destination>(destination: &D) -> Result<Self> {
        let payload =
            serde_json::to_value(destination).map_err(|source| ModelError::PayloadEncode {
                kind: D::KIND.to_string(),
                source,
            })?;
        let capabilities = Capabilities {
            push: D::SUPPORTS_PUSH,
            present: D::SUPPORTS_PRESENT,
            result_type: None,
        };
        Ok(Self::new(D::descriptor_id(), capabilities, payload))
    }

    /// Describe a typed destination, declaring its result type.
    pub fn of_with_result<D: WithResult>(destination: &D) -> Result<Self> {
        let mut descriptor = Self::of(destination)?;
        descriptor.capabilities.result_type =
            Some(result_type_name::<D::Output>().to_string());
        Ok(descriptor)
    }

    pub fn id(&self) -> &DescriptorId {
        &self.id
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn supports(&self, direction: NavigationDirection) -> bool {
        self.capabilities.supports(direction)
    }

    /// Type name of the declared result, if the kind returns one.
    pub fn expected_result_type(&self) -> Option<&str> {
        self.capabilities.result_type.as_deref()
    }

    /// Whether this descriptor was built from destination type `D`.
    pub fn is<D: Destination>(&self) -> bool {
        self.id.as_str() == D::KIND
    }

    /// Decode the payload back into the typed destination.
    pub fn decode<D: Destination>(&self) -> Result<D> {
        if !self.is::<D>() {
            return Err(ModelError::KindMismatch {
                expected: D::KIND.to_string(),
                found: self.id.to_string(),
            });
        }
        serde_json::from_value(self.payload.clone()).map_err(|source| ModelError::PayloadDecode {
            kind: D::KIND.to_string(),
            source,
        })
    }

    /// Copy of this descriptor with one more metadata entry.
    pub fn with_metadata<V: Serialize>(&self, key: &MetadataKey<V>, value: V) -> Result<Self> {
        let mut copy = self.clone();
        copy.metadata.set(key, value)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        user_id: u64,
    }

    impl Destination for Profile {
        const KIND: &'static str = "profile";
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct PickColor;

    impl Destination for PickColor {
        const KIND: &'static str = "pick-color";
        const SUPPORTS_PUSH: bool = false;
        const SUPPORTS_PRESENT: bool = true;
    }

    impl WithResult for PickColor {
        type Output = String;
    }

    const SOURCE: MetadataKey<String> = MetadataKey::new("test.source");

    #[test]
    fn typed_destination_round_trip() {
        let descriptor = Descriptor::of(&Profile { user_id: 9 }).unwrap();
        assert!(descriptor.is::<Profile>());
        assert!(!descriptor.is::<PickColor>());
        assert_eq!(descriptor.decode::<Profile>().unwrap(), Profile { user_id: 9 });
        assert!(descriptor.supports(NavigationDirection::Push));
        assert!(!descriptor.supports(NavigationDirection::Present));
    }

    #[test]
    fn decoding_as_other_kind_fails() {
        let descriptor = Descriptor::of(&Profile { user_id: 1 }).unwrap();
        assert!(matches!(
            descriptor.decode::<PickColor>(),
            Err(ModelError::KindMismatch { .. })
        ));
    }

    #[test]
    fn result_destinations_declare_their_output() {
        let descriptor = Descriptor::of_with_result(&PickColor).unwrap();
        assert_eq!(
            descriptor.expected_result_type(),
            Some(result_type_name::<String>())
        );
        assert_eq!(PickColor::preferred_direction(), NavigationDirection::Present);
    }

    #[test]
    fn with_metadata_copies() {
        let original = Descriptor::of(&Profile { user_id: 1 }).unwrap();
        let tagged = original
            .with_metadata(&SOURCE, "deep-link".to_string())
            .unwrap();
        assert!(original.metadata().is_empty());
        assert_eq!(tagged.metadata().get(&SOURCE).as_deref(), Some("deep-link"));
    }
}
