//! Configuration: the connected database read models live in, plus optional
//! collection name overrides.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::read_model::{CollectionName, ReadModel};
use crate::store::{DocumentDatabase, InMemoryClient, InMemoryDatabase};

/// Database used when settings name none.
pub const DEFAULT_DATABASE: &str = "read_models";

/// Environment variable prefix for settings (`READMODELS__DATABASE=...`).
pub const ENV_PREFIX: &str = "READMODELS";

/// Handle to an already-connected database plus the collection name table.
pub struct Configuration<D> {
    database: D,
    overrides: HashMap<String, CollectionName>,
}

impl<D: DocumentDatabase> Configuration<D> {
    /// Wrap an already-connected database. Every read model uses its derived
    /// collection name until overridden.
    pub fn new(database: D) -> Self {
        Self {
            database,
            overrides: HashMap::new(),
        }
    }

    /// Store the read model named `type_name` in `collection` instead of the
    /// derived name. The name is validated here.
    pub fn with_collection(mut self, type_name: &str, collection: &str) -> Result<Self> {
        let name = CollectionName::parse(collection)?;
        self.overrides.insert(type_name.to_string(), name);
        Ok(self)
    }

    /// The database repositories bind their collections in.
    pub fn database(&self) -> &D {
        &self.database
    }

    /// The collection `M` is stored in.
    pub fn collection_name_for<M: ReadModel>(&self) -> Result<CollectionName> {
        match self.overrides.get(M::TYPE_NAME) {
            Some(name) => Ok(name.clone()),
            None => M::collection_name(),
        }
    }
}

impl Configuration<InMemoryDatabase> {
    /// Open the configured database on an in-memory client.
    pub fn from_settings(client: &InMemoryClient, settings: &ReadModelSettings) -> Result<Self> {
        let mut config = Configuration::new(client.database(&settings.database)?);
        for entry in &settings.collections {
            config = config.with_collection(&entry.type_name, &entry.collection)?;
        }

        tracing::info!(
            database = %settings.database,
            overrides = settings.collections.len(),
            "read model configuration loaded"
        );
        Ok(config)
    }
}

/// One entry of the collection name table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionOverride {
    pub type_name: String,
    pub collection: String,
}

/// Read model settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadModelSettings {
    /// Database name
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection name overrides, by read model type name
    #[serde(default)]
    pub collections: Vec<CollectionOverride>,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Default for ReadModelSettings {
    fn default() -> Self {
        Self {
            database: default_database(),
            collections: Vec::new(),
        }
    }
}

impl ReadModelSettings {
    /// Loads settings from the environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Loads settings from an optional file, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder().set_default("database", DEFAULT_DATABASE)?;
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
