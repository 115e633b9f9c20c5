//! Generic read model repositories for the query side of a CQRS system.
//!
//! A [`ReadModelRepository`] binds a read model type to a collection in a
//! document store and offers insert, save (update-or-insert), lookup by id,
//! delete and a lazy [`Query`] surface. The store itself sits behind the
//! [`DocumentDatabase`] / [`DocumentCollection`] traits; [`InMemoryClient`]
//! provides a reference implementation.

// Lets `#[derive(ReadModel)]` expand to `::readmodels::...` inside this crate.
extern crate self as readmodels;

mod configuration;
mod document;
mod error;
mod read_model;
mod store;

pub use configuration::{
    CollectionOverride, Configuration, ReadModelSettings, DEFAULT_DATABASE, ENV_PREFIX,
};
pub use document::{
    binary_uuid, Bson, Document, DocumentId, Filter, ObjectId, ReplaceOptions, ReplaceOutcome,
    ID_FIELD,
};
pub use error::{ReadModelError, Result};
pub use read_model::{
    strip_read_namespace, CollectionName, FieldIdentity, Identified, IdentityOf, ModelIdentity,
    Projection, Query, ReadModel, ReadModelRepository, ReadModelsExt, READ_NAMESPACE,
};
pub use store::{
    DocumentCollection, DocumentDatabase, InMemoryClient, InMemoryCollection, InMemoryDatabase,
};

// Re-export the derive macro; it shares the trait's name in the macro namespace.
pub use readmodels_macros::ReadModel;
