//! Documents, identifiers and equality filters exchanged with a document store.

mod id;

pub use id::{binary_uuid, DocumentId, ObjectId};

pub use bson::{Bson, Document};

/// Field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// A filter evaluated by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches documents whose `field` equals `value`. Dotted paths address
    /// nested fields.
    Eq { field: String, value: Bson },
    /// Matches documents accepted by every inner filter.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Equality on the identifier field.
    pub fn id(id: &DocumentId) -> Self {
        Filter::eq(ID_FIELD, id.as_bson().clone())
    }

    /// Combine with another filter; `All` is the identity.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, other) | (other, Filter::All) => other,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), other) => {
                left.push(other);
                Filter::And(left)
            }
            (this, other) => Filter::And(vec![this, other]),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => {
                lookup(document, field).is_some_and(|found| same_value(found, value))
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }

    /// The identifier this filter pins, if it is an `_id` equality.
    pub fn pinned_id(&self) -> Option<&Bson> {
        match self {
            Filter::Eq { field, value } if field == ID_FIELD => Some(value),
            Filter::And(filters) => filters.iter().find_map(Filter::pinned_id),
            _ => None,
        }
    }
}

/// Value equality as the store applies it: numbers compare by value across
/// 32-bit, 64-bit and double representations.
pub(crate) fn same_value(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Int32(x), Bson::Int64(y)) | (Bson::Int64(y), Bson::Int32(x)) => {
            i64::from(*x) == *y
        }
        (Bson::Int32(x), Bson::Double(y)) | (Bson::Double(y), Bson::Int32(x)) => {
            f64::from(*x) == *y
        }
        (Bson::Int64(x), Bson::Double(y)) | (Bson::Double(y), Bson::Int64(x)) => {
            *x as f64 == *y
        }
        _ => a == b,
    }
}

/// An `_id` value as it appears in errors and logs.
pub(crate) fn display_id(id: &Bson) -> String {
    DocumentId::try_from(id.clone())
        .map(|id| id.to_string())
        .unwrap_or_else(|_| id.to_string())
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(inner) => inner.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Options for `replace_one`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Insert the replacement when nothing matches.
    pub upsert: bool,
}

impl ReplaceOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// Result of a `replace_one`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOutcome {
    pub matched: u64,
    pub modified: u64,
    /// Identifier of the inserted document when the replace turned into an insert.
    pub upserted_id: Option<Bson>,
}
