use thiserror::Error;

/// Errors raised by read model repositories and the document stores behind them.
///
/// Store faults pass through unchanged; a missing document is never an error
/// (lookups return `Ok(None)`).
#[derive(Debug, Error)]
pub enum ReadModelError {
    /// A document with the same `_id` already exists in the collection.
    #[error("duplicate key in {collection}: {id}")]
    DuplicateKey { collection: String, id: String },

    /// The model serialized without an `_id` field.
    #[error("read model {type_name} has no `_id` field")]
    MissingIdentifier { type_name: &'static str },

    /// A collection name failed validation.
    #[error("invalid collection name {name:?}: {reason}")]
    InvalidCollectionName { name: String, reason: &'static str },

    /// A value could not be read as a store-native identifier.
    #[error("invalid document id: {0}")]
    InvalidIdentifier(String),

    /// The serialized `_id` disagrees with the identifier the repository's
    /// identity extractor produced for the same model.
    #[error("read model {type_name} serializes _id {stored} but its identity is {identity}")]
    IdentifierMismatch {
        type_name: &'static str,
        stored: String,
        identity: String,
    },

    /// A model could not be serialized into a document.
    #[error("read model serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// A stored document could not be read back as a model.
    #[error("read model deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    /// Storage-level error.
    #[error("read model storage error: {0}")]
    Storage(String),

    /// Settings could not be loaded.
    #[error("read model settings error: {0}")]
    Settings(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ReadModelError>;
