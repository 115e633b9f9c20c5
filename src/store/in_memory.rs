//! In-memory document store for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{DocumentCollection, DocumentDatabase};
use crate::document::{
    display_id, same_value, Bson, Document, Filter, ObjectId, ReplaceOptions, ReplaceOutcome,
    ID_FIELD,
};
use crate::error::{ReadModelError, Result};
use crate::read_model::CollectionName;

/// In-memory client holding any number of named databases.
///
/// Clone-friendly via Arc; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryClient {
    databases: Arc<RwLock<HashMap<String, InMemoryDatabase>>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the named database, creating it on first use.
    pub fn database(&self, name: &str) -> Result<InMemoryDatabase> {
        let mut databases = self
            .databases
            .write()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        Ok(databases
            .entry(name.to_string())
            .or_insert_with(|| InMemoryDatabase::new(name))
            .clone())
    }
}

/// In-memory database: a set of named collections.
#[derive(Clone)]
pub struct InMemoryDatabase {
    name: String,
    collections: Arc<RwLock<HashMap<String, InMemoryCollection>>>,
}

impl InMemoryDatabase {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Names of the collections created so far, sorted.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl DocumentDatabase for InMemoryDatabase {
    type Collection = InMemoryCollection;

    fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self, name: &CollectionName) -> Result<InMemoryCollection> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        Ok(collections
            .entry(name.as_str().to_string())
            .or_insert_with(|| InMemoryCollection::new(name.as_str()))
            .clone())
    }
}

/// In-memory collection backed by a Vec kept in insertion order.
#[derive(Clone)]
pub struct InMemoryCollection {
    name: String,
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryCollection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn duplicate_key(&self, id: &Bson) -> ReadModelError {
        ReadModelError::DuplicateKey {
            collection: self.name.clone(),
            id: display_id(id),
        }
    }
}

fn contains_id(documents: &[Document], id: &Bson) -> bool {
    documents
        .iter()
        .any(|d| d.get(ID_FIELD).is_some_and(|stored| same_value(stored, id)))
}

/// The document as stored: `_id` first, followed by the remaining fields.
fn with_leading_id(id: Bson, document: Document) -> Document {
    let mut stored = Document::new();
    stored.insert(ID_FIELD, id);
    for (key, value) in document {
        if key != ID_FIELD {
            stored.insert(key, value);
        }
    }
    stored
}

impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        let found: Vec<Document> = documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();

        tracing::trace!(collection = %self.name, matched = found.len(), "find");
        Ok(found)
    }

    fn insert_one(&self, document: Document) -> Result<()> {
        let id = match document.get(ID_FIELD) {
            Some(id) => id.clone(),
            None => Bson::ObjectId(ObjectId::new()),
        };

        let mut documents = self
            .documents
            .write()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        if contains_id(&documents, &id) {
            return Err(self.duplicate_key(&id));
        }

        documents.push(with_leading_id(id, document));
        Ok(())
    }

    fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        options: ReplaceOptions,
    ) -> Result<ReplaceOutcome> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        if let Some(existing) = documents.iter_mut().find(|d| filter.matches(d)) {
            let replacement = match existing.get(ID_FIELD).cloned() {
                Some(current_id) => {
                    if let Some(new_id) = replacement.get(ID_FIELD) {
                        if !same_value(new_id, &current_id) {
                            return Err(ReadModelError::Storage(format!(
                                "replacement in {} would change immutable _id {}",
                                self.name,
                                display_id(&current_id)
                            )));
                        }
                    }
                    with_leading_id(current_id, replacement)
                }
                None => replacement,
            };

            let modified = u64::from(*existing != replacement);
            *existing = replacement;
            tracing::trace!(collection = %self.name, modified, "replaced document");
            return Ok(ReplaceOutcome {
                matched: 1,
                modified,
                upserted_id: None,
            });
        }

        if !options.upsert {
            return Ok(ReplaceOutcome {
                matched: 0,
                modified: 0,
                upserted_id: None,
            });
        }

        let id = match (replacement.get(ID_FIELD), filter.pinned_id()) {
            (Some(id), _) | (None, Some(id)) => id.clone(),
            (None, None) => Bson::ObjectId(ObjectId::new()),
        };

        if contains_id(&documents, &id) {
            return Err(self.duplicate_key(&id));
        }

        documents.push(with_leading_id(id.clone(), replacement));
        tracing::trace!(collection = %self.name, id = %display_id(&id), "upserted document");

        Ok(ReplaceOutcome {
            matched: 0,
            modified: 0,
            upserted_id: Some(id),
        })
    }

    fn delete_one(&self, filter: &Filter) -> Result<u64> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        match documents.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn count(&self, filter: &Filter) -> Result<u64> {
        let documents = self
            .documents
            .read()
            .map_err(|_| ReadModelError::Storage("lock poisoned".into()))?;

        Ok(documents.iter().filter(|d| filter.matches(d)).count() as u64)
    }
}
