use std::fmt;

use crate::error::{ReadModelError, Result};

/// Namespace segment removed from a type name to form its collection name.
pub const READ_NAMESPACE: &str = "Read.";

/// A validated collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(String);

impl CollectionName {
    /// Derive the collection name for a fully qualified type name.
    ///
    /// A single leading `Read.` segment is removed; any other name is kept
    /// verbatim. Existing data is laid out by this rule, so it must not change.
    pub fn from_type_name(type_name: &str) -> Result<Self> {
        Self::parse(strip_read_namespace(type_name))
    }

    /// Validate a collection name as given, without namespace stripping.
    ///
    /// Rejects empty names, `$`, NUL and the reserved `system.` prefix.
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name.contains('$') {
            Some("must not contain '$'")
        } else if name.contains('\0') {
            Some("must not contain NUL")
        } else if name.starts_with("system.") {
            Some("the system. prefix is reserved")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ReadModelError::InvalidCollectionName { name, reason }),
            None => Ok(CollectionName(name)),
        }
    }

    /// The name as the store sees it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Remove one leading `Read.` from a type name.
pub fn strip_read_namespace(type_name: &str) -> &str {
    type_name.strip_prefix(READ_NAMESPACE).unwrap_or(type_name)
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
