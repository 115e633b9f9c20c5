//! Read Models - denormalized query-side projections kept in a document store.
//!
//! A read model type names itself with a fully qualified `TYPE_NAME`; its
//! collection is that name with a leading `Read.` removed.
//!
//! ## Example
//!
//! ```ignore
//! use readmodels::{Configuration, InMemoryClient, ReadModel, ReadModelsExt};
//!
//! #[derive(Serialize, Deserialize, ReadModel)]
//! #[readmodel(name = "Read.Games.GameView")]
//! struct GameView {
//!     #[serde(rename = "_id")]
//!     pub id: String,
//!     pub score: u32,
//! }
//!
//! let client = InMemoryClient::new();
//! let config = Configuration::new(client.database("games")?);
//! let games = config.read_models::<GameView>()?; // collection "Games.GameView"
//! games.update(&view)?;
//! let loaded = games.get_by_id("game-1")?;
//! ```

mod collection_name;
mod identity;
mod query;
mod repository;

use serde::{de::DeserializeOwned, Serialize};

use crate::document::DocumentId;
use crate::error::Result;

/// Trait for types that can be stored as read models.
pub trait ReadModel: Serialize + DeserializeOwned + Send + Sync {
    /// Fully qualified, dot-separated type name (e.g. "Read.Orders.OrderSummary").
    const TYPE_NAME: &'static str;

    /// The collection this type is stored in.
    fn collection_name() -> Result<CollectionName> {
        CollectionName::from_type_name(Self::TYPE_NAME)
    }
}

/// Read models that expose their own store-native identifier.
pub trait Identified {
    fn document_id(&self) -> DocumentId;
}

pub use collection_name::{strip_read_namespace, CollectionName, READ_NAMESPACE};
pub use identity::{FieldIdentity, IdentityOf, ModelIdentity};
pub use query::{Projection, Query};
pub use repository::{ReadModelRepository, ReadModelsExt};
