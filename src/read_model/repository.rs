//! ReadModelRepository - Typed CRUD access to one read model collection.

use std::marker::PhantomData;

use super::{CollectionName, FieldIdentity, IdentityOf, Query, ReadModel};
use crate::configuration::Configuration;
use crate::document::{
    display_id, same_value, Document, DocumentId, Filter, ReplaceOptions, ID_FIELD,
};
use crate::error::{ReadModelError, Result};
use crate::store::{DocumentCollection, DocumentDatabase};

/// Repository for read models of type `M`, bound to the collection derived
/// from `M::TYPE_NAME` at construction.
///
/// Every operation is one round trip to the store; store errors are returned
/// as-is. Absent documents are `Ok(None)` on lookup and a no-op on delete.
pub struct ReadModelRepository<M, C, I = FieldIdentity> {
    collection_name: CollectionName,
    collection: C,
    identity: I,
    _marker: PhantomData<fn() -> M>,
}

impl<M: ReadModel, C: DocumentCollection> ReadModelRepository<M, C, FieldIdentity> {
    /// Bind to the configured database, reading identifiers from the `_id` field.
    pub fn new<D>(config: &Configuration<D>) -> Result<Self>
    where
        D: DocumentDatabase<Collection = C>,
    {
        Self::with_identity(config, FieldIdentity)
    }
}

impl<M, C, I> ReadModelRepository<M, C, I>
where
    M: ReadModel,
    C: DocumentCollection,
    I: IdentityOf<M>,
{
    /// Bind to the configured database with an explicit identity extractor.
    pub fn with_identity<D>(config: &Configuration<D>, identity: I) -> Result<Self>
    where
        D: DocumentDatabase<Collection = C>,
    {
        let collection_name = config.collection_name_for::<M>()?;
        let collection = config.database().collection(&collection_name)?;

        tracing::info!(
            read_model = M::TYPE_NAME,
            collection = %collection_name,
            database = config.database().name(),
            "read model repository bound"
        );

        Ok(Self {
            collection_name,
            collection,
            identity,
            _marker: PhantomData,
        })
    }

    /// The collection this repository reads and writes.
    pub fn collection_name(&self) -> &CollectionName {
        &self.collection_name
    }

    /// The underlying collection handle.
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// A lazy query over every document in the collection.
    pub fn query(&self) -> Query<M, C> {
        Query::new(self.collection.clone())
    }

    /// Insert a new read model. Fails with `DuplicateKey` if its id exists.
    ///
    /// The document is stored under the id the identity extractor reports,
    /// so `get_by_id` and `delete` find it again.
    pub fn insert(&self, model: &M) -> Result<()> {
        let id = self.identity.identifier_of(model)?;
        let document = document_with_id(model, &id)?;

        tracing::debug!(collection = %self.collection_name, %id, "inserting read model");
        self.collection.insert_one(document)
    }

    /// Save a read model: replace the document with its id, or insert it if
    /// there is none.
    ///
    /// The upsert is deliberate. Projections call this to write the current
    /// state without first checking whether it exists.
    pub fn update(&self, model: &M) -> Result<()> {
        let id = self.identity.identifier_of(model)?;
        let filter = Filter::id(&id);
        let document = document_with_id(model, &id)?;

        let outcome = self
            .collection
            .replace_one(&filter, document, ReplaceOptions::upsert())?;

        tracing::debug!(
            collection = %self.collection_name,
            %id,
            upserted = outcome.upserted_id.is_some(),
            "saved read model"
        );
        Ok(())
    }

    /// Load a read model by id. Returns None if not found.
    pub fn get_by_id(&self, id: impl Into<DocumentId>) -> Result<Option<M>> {
        let id = id.into();
        let found = self.collection.find_one(&Filter::id(&id))?;

        tracing::debug!(
            collection = %self.collection_name,
            %id,
            found = found.is_some(),
            "loaded read model"
        );

        match found {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Delete a read model. Deleting one that does not exist is not an error.
    pub fn delete(&self, model: &M) -> Result<()> {
        let id = self.identity.identifier_of(model)?;
        let deleted = self.collection.delete_one(&Filter::id(&id))?;

        tracing::debug!(collection = %self.collection_name, %id, deleted, "deleted read model");
        Ok(())
    }
}

/// Serialize a model and make sure it is stored under `id`.
///
/// A model without an `_id` field gets one; a model whose `_id` disagrees
/// with `id` is rejected rather than stored where lookups would miss it.
fn document_with_id<M: ReadModel>(model: &M, id: &DocumentId) -> Result<Document> {
    let document = bson::to_document(model)?;

    match document.get(ID_FIELD).cloned() {
        Some(stored) if same_value(&stored, id.as_bson()) => Ok(document),
        Some(stored) => Err(ReadModelError::IdentifierMismatch {
            type_name: M::TYPE_NAME,
            stored: display_id(&stored),
            identity: id.to_string(),
        }),
        None => {
            let mut keyed = Document::new();
            keyed.insert(ID_FIELD, id.as_bson().clone());
            for (key, value) in document {
                keyed.insert(key, value);
            }
            Ok(keyed)
        }
    }
}

/// Extension trait for typed read model access on a configuration.
pub trait ReadModelsExt {
    type Collection: DocumentCollection;

    /// Get a typed read model repository.
    fn read_models<M: ReadModel>(
        &self,
    ) -> Result<ReadModelRepository<M, Self::Collection, FieldIdentity>>;
}

impl<D: DocumentDatabase> ReadModelsExt for Configuration<D> {
    type Collection = D::Collection;

    fn read_models<M: ReadModel>(&self) -> Result<ReadModelRepository<M, D::Collection>> {
        ReadModelRepository::new(self)
    }
}
