//! Store-native document identifiers.

use std::fmt;

use bson::spec::BinarySubtype;
use bson::{Binary, Bson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ReadModelError, Result};

pub use bson::oid::ObjectId;

/// Serde helper storing a `Uuid` field as a subtype 4 binary, so that
/// `get_by_id(uuid)` matches it.
///
/// ```ignore
/// #[serde(rename = "_id", with = "readmodels::binary_uuid")]
/// pub id: Uuid,
/// ```
pub use bson::serde_helpers::uuid_1_as_binary as binary_uuid;

/// The store-native identifier of a document: the exact value held in its
/// `_id` field.
///
/// An equality filter built from a `DocumentId` matches the stored document,
/// so a hex string never matches an `ObjectId` and a text UUID never matches
/// a binary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Bson);

impl DocumentId {
    /// The value stored in a document's `_id` field.
    pub fn as_bson(&self) -> &Bson {
        &self.0
    }

    pub fn into_bson(self) -> Bson {
        self.0
    }

    pub fn as_object_id(&self) -> Option<ObjectId> {
        self.0.as_object_id()
    }

    /// The UUID carried by a binary UUID identifier, in either the standard
    /// or the legacy subtype.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match &self.0 {
            Bson::Binary(Binary {
                subtype: BinarySubtype::Uuid | BinarySubtype::UuidOld,
                bytes,
            }) => Uuid::from_slice(bytes).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Bson::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
            Bson::String(s) => f.write_str(s),
            Bson::Int32(n) => write!(f, "{}", n),
            Bson::Int64(n) => write!(f, "{}", n),
            other => match self.as_uuid() {
                Some(uuid) => write!(f, "{}", uuid),
                None => write!(f, "{}", other),
            },
        }
    }
}

/// Read an identifier back from a stored `_id` value.
///
/// Arrays, regular expressions and `undefined` can never be document ids.
impl TryFrom<Bson> for DocumentId {
    type Error = ReadModelError;

    fn try_from(value: Bson) -> Result<Self> {
        match value {
            Bson::Array(_) | Bson::RegularExpression(_) | Bson::Undefined => Err(
                ReadModelError::InvalidIdentifier(format!("unsupported id value {}", value)),
            ),
            value => Ok(DocumentId(value)),
        }
    }
}

/// Unsigned ids are stored as 64-bit signed integers; larger values have no
/// stored form.
impl TryFrom<u64> for DocumentId {
    type Error = ReadModelError;

    fn try_from(n: u64) -> Result<Self> {
        i64::try_from(n).map(DocumentId::from).map_err(|_| {
            ReadModelError::InvalidIdentifier(format!("{} does not fit a 64-bit signed id", n))
        })
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        DocumentId(Bson::ObjectId(oid))
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId(Bson::String(s))
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId(Bson::String(s.to_string()))
    }
}

impl From<&String> for DocumentId {
    fn from(s: &String) -> Self {
        DocumentId(Bson::String(s.clone()))
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        DocumentId(Bson::Int64(n))
    }
}

impl From<i32> for DocumentId {
    fn from(n: i32) -> Self {
        DocumentId(Bson::Int32(n))
    }
}

// Matches how the serializer stores a u32 field.
impl From<u32> for DocumentId {
    fn from(n: u32) -> Self {
        DocumentId(Bson::Int64(n.into()))
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        DocumentId(Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: uuid.as_bytes().to_vec(),
        }))
    }
}
