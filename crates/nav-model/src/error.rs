//! Model error types.

use thiserror::Error;

/// Errors raised while building or decoding model values.
///
/// Every variant describes a programming error at a registration or call
/// site (an empty identifier, a payload that cannot be encoded, a value read
/// back as the wrong type). None of them describe a navigation race.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An identifier was empty or whitespace.
    #[error("invalid {kind}: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    /// A metadata value could not be encoded.
    #[error("failed to encode metadata value for key '{key}'")]
    MetadataEncode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored metadata value does not decode as the key's value type.
    #[error("metadata value for key '{key}' does not match the key's type")]
    MetadataDecode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A destination or result payload could not be encoded.
    #[error("failed to encode payload for '{kind}'")]
    PayloadEncode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// A destination or result payload could not be decoded.
    #[error("failed to decode payload for '{kind}'")]
    PayloadDecode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// A descriptor was decoded as a destination of another kind.
    #[error("descriptor kind mismatch: expected '{expected}', found '{found}'")]
    KindMismatch { expected: String, found: String },

    /// A result payload was read back as a different type than it was written with.
    #[error("result type mismatch: expected '{expected}', found '{found}'")]
    ResultTypeMismatch { expected: String, found: String },
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
