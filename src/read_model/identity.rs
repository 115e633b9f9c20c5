use super::{Identified, ReadModel};
use crate::document::{DocumentId, ID_FIELD};
use crate::error::{ReadModelError, Result};

/// Extracts the store-native identifier of a read model instance.
///
/// Passed to a repository explicitly. Closures `Fn(&M) -> DocumentId` work too.
pub trait IdentityOf<M>: Send + Sync {
    fn identifier_of(&self, model: &M) -> Result<DocumentId>;
}

/// Reads the `_id` field of the serialized model. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldIdentity;

impl<M: ReadModel> IdentityOf<M> for FieldIdentity {
    fn identifier_of(&self, model: &M) -> Result<DocumentId> {
        let mut document = bson::to_document(model)?;
        match document.remove(ID_FIELD) {
            Some(id) => DocumentId::try_from(id),
            None => Err(ReadModelError::MissingIdentifier {
                type_name: M::TYPE_NAME,
            }),
        }
    }
}

/// Uses the model's own `Identified` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelIdentity;

impl<M: Identified> IdentityOf<M> for ModelIdentity {
    fn identifier_of(&self, model: &M) -> Result<DocumentId> {
        Ok(model.document_id())
    }
}

impl<M, F> IdentityOf<M> for F
where
    F: Fn(&M) -> DocumentId + Send + Sync,
{
    fn identifier_of(&self, model: &M) -> Result<DocumentId> {
        Ok(self(model))
    }
}
