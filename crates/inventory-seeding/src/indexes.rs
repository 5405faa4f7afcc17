//! Secondary indexes created after the data is in place

use inventory_core::{Entity, LogEntry, Sector, Warehouse};
use inventory_store::{DocumentStore, IndexSpec};

use crate::error::{SeedError, SeedResult};

/// An index bound to the collection it lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionIndex {
    pub collection: String,
    pub index: IndexSpec,
}

/// Ordered list of indexes to create
#[derive(Debug, Clone, Default)]
pub struct IndexPlan {
    indexes: Vec<CollectionIndex>,
}

impl IndexPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookups by creator, by sector and by warehouse
    pub fn standard() -> Self {
        Self::new()
            .ascending(Sector::COLLECTION, "creator")
            .ascending(Warehouse::COLLECTION, "creator")
            .ascending(Warehouse::COLLECTION, "sector")
            .ascending(LogEntry::COLLECTION, "warehouse")
            .ascending(LogEntry::COLLECTION, "creator")
    }

    pub fn add(mut self, collection: impl Into<String>, index: IndexSpec) -> Self {
        self.indexes.push(CollectionIndex {
            collection: collection.into(),
            index,
        });
        self
    }

    pub fn ascending(self, collection: impl Into<String>, field: impl Into<String>) -> Self {
        self.add(collection, IndexSpec::ascending(field))
    }

    pub fn indexes(&self) -> &[CollectionIndex] {
        &self.indexes
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Create every index in order, stopping at the first failure
    pub async fn apply(&self, store: &dyn DocumentStore) -> SeedResult<Vec<String>> {
        let mut created = Vec::with_capacity(self.indexes.len());
        for entry in &self.indexes {
            let name = store
                .create_index(&entry.collection, &entry.index)
                .await
                .map_err(|source| SeedError::Index {
                    collection: entry.collection.clone(),
                    index: entry.index.name(),
                    source,
                })?;

            tracing::info!(collection = %entry.collection, index = %name, "Created index");
            created.push(format!("{}.{}", entry.collection, name));
        }
        Ok(created)
    }
}
