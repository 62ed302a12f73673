//! Typed metadata store.
//!
//! Metadata is an open-ended key/value map attached to descriptors and
//! instances. Keys are [`MetadataKey<V>`] values whose type parameter fixes
//! the value type, so reads and writes through a key are type checked at the
//! call site. Values are stored encoded as JSON so that metadata survives
//! state restoration together with the instance that carries it.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A metadata key whose value type is `V`.
///
/// ```
/// use nav_model::{Metadata, MetadataKey};
///
/// const TITLE: MetadataKey<String> = MetadataKey::new("app.title");
///
/// let mut metadata = Metadata::new();
/// metadata.set(&TITLE, "Inbox".to_string()).unwrap();
/// assert_eq!(metadata.get(&TITLE).as_deref(), Some("Inbox"));
/// ```
pub struct MetadataKey<V> {
    name: &'static str,
    _value: PhantomData<fn() -> V>,
}

impl<V> MetadataKey<V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<V> Clone for MetadataKey<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for MetadataKey<V> {}

impl<V> fmt::Debug for MetadataKey<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetadataKey").field(&self.name).finish()
    }
}

/// Key/value metadata with typed access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    values: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value, treating an undecodable value as absent.
    ///
    /// A decode failure means two keys with different value types share a
    /// name; it is logged and reported as `None`. Use [`Metadata::try_get`]
    /// to surface it instead.
    pub fn get<V: DeserializeOwned>(&self, key: &MetadataKey<V>) -> Option<V> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key = key.name(), %error, "Ignoring undecodable metadata value");
                None
            }
        }
    }

    /// Read a value, failing if the stored value does not decode as `V`.
    pub fn try_get<V: DeserializeOwned>(&self, key: &MetadataKey<V>) -> Result<Option<V>> {
        let Some(raw) = self.values.get(key.name()) else {
            return Ok(None);
        };
        serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|source| ModelError::MetadataDecode {
                key: key.name().to_string(),
                source,
            })
    }

    /// Store a value, replacing any previous value for the key.
    pub fn set<V: Serialize>(&mut self, key: &MetadataKey<V>, value: V) -> Result<()> {
        let encoded = serde_json::to_value(value).map_err(|source| ModelError::MetadataEncode {
            key: key.name().to_string(),
            source,
        })?;
        self.values.insert(key.name().to_string(), encoded);
        Ok(())
    }

    /// Builder form of [`Metadata::set`].
    pub fn with<V: Serialize>(mut self, key: &MetadataKey<V>, value: V) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Remove a value. Returns whether the key was present.
    pub fn remove<V>(&mut self, key: &MetadataKey<V>) -> bool {
        self.values.remove(key.name()).is_some()
    }

    pub fn contains<V>(&self, key: &MetadataKey<V>) -> bool {
        self.values.contains_key(key.name())
    }

    /// Copy every entry of `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: &Metadata) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: MetadataKey<u32> = MetadataKey::new("test.count");
    const COUNT_AS_TEXT: MetadataKey<String> = MetadataKey::new("test.count");
    const TAGS: MetadataKey<Vec<String>> = MetadataKey::new("test.tags");

    #[test]
    fn typed_round_trip() {
        let mut metadata = Metadata::new();
        metadata.set(&COUNT, 3).unwrap();
        metadata
            .set(&TAGS, vec!["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(metadata.get(&COUNT), Some(3));
        assert_eq!(metadata.get(&TAGS).map(|tags| tags.len()), Some(2));
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn mistyped_read_is_absent_but_reported_by_try_get() {
        let metadata = Metadata::new().with(&COUNT, 7).unwrap();

        assert_eq!(metadata.get(&COUNT_AS_TEXT), None);
        assert!(matches!(
            metadata.try_get(&COUNT_AS_TEXT),
            Err(ModelError::MetadataDecode { .. })
        ));
    }

    #[test]
    fn merge_prefers_other() {
        let mut base = Metadata::new().with(&COUNT, 1).unwrap();
        let other = Metadata::new().with(&COUNT, 2).unwrap();
        base.merge(&other);
        assert_eq!(base.get(&COUNT), Some(2));
    }

    #[test]
    fn remove_reports_presence() {
        let mut metadata = Metadata::new().with(&COUNT, 1).unwrap();
        assert!(metadata.remove(&COUNT));
        assert!(!metadata.remove(&COUNT));
        assert!(metadata.is_empty());
    }
}
