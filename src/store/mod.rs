//! Document store capability: the driver surface read model repositories run on.

mod in_memory;

use crate::document::{Document, Filter, ReplaceOptions, ReplaceOutcome};
use crate::error::Result;
use crate::read_model::CollectionName;

/// A handle to one named collection.
///
/// Handles are cheap to clone and safe to share between threads; every call
/// is a single round trip to the store.
pub trait DocumentCollection: Clone + Send + Sync {
    fn name(&self) -> &str;

    /// All documents matching the filter, in insertion order.
    fn find(&self, filter: &Filter) -> Result<Vec<Document>>;

    /// The first document matching the filter.
    fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(filter)?.into_iter().next())
    }

    /// Insert a document. Fails with `DuplicateKey` if its `_id` is taken.
    fn insert_one(&self, document: Document) -> Result<()>;

    /// Replace the first matching document, optionally inserting when nothing matches.
    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: ReplaceOptions,
    ) -> Result<ReplaceOutcome>;

    /// Delete the first matching document. Returns the number deleted.
    fn delete_one(&self, filter: &Filter) -> Result<u64>;

    fn count(&self, filter: &Filter) -> Result<u64> {
        Ok(self.find(filter)?.len() as u64)
    }
}

/// An already-connected database that hands out collection handles.
pub trait DocumentDatabase: Send + Sync {
    type Collection: DocumentCollection;

    fn name(&self) -> &str;

    /// Get a handle to the named collection, creating it lazily if needed.
    fn collection(&self, name: &CollectionName) -> Result<Self::Collection>;
}

pub use in_memory::{InMemoryClient, InMemoryCollection, InMemoryDatabase};
