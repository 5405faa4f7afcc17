//! Post-seed document counts

use std::fmt;

use inventory_core::{Entity, LogEntry, Sector, Warehouse};
use inventory_store::DocumentStore;

use crate::error::{SeedError, SeedResult};

pub const COMPLETION_MESSAGE: &str = "Database setup completed successfully!";

/// Document count of one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCount {
    pub label: &'static str,
    pub collection: &'static str,
    pub count: u64,
}

/// Result of a successful seed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub counts: Vec<CollectionCount>,
    pub indexes: Vec<String>,
}

impl SeedSummary {
    /// Collections reported after a run, with their display labels
    pub const REPORTED: [(&'static str, &'static str); 3] = [
        ("Sectors", Sector::COLLECTION),
        ("Warehouses", Warehouse::COLLECTION),
        ("LogDatas", LogEntry::COLLECTION),
    ];

    /// Count the reported collections
    pub async fn collect(store: &dyn DocumentStore, indexes: Vec<String>) -> SeedResult<Self> {
        let mut counts = Vec::with_capacity(Self::REPORTED.len());
        for (label, collection) in Self::REPORTED {
            let count = store
                .count_documents(collection)
                .await
                .map_err(|source| SeedError::Count {
                    collection: collection.to_string(),
                    source,
                })?;
            counts.push(CollectionCount {
                label,
                collection,
                count,
            });
        }

        Ok(Self { counts, indexes })
    }

    pub fn count(&self, collection: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.collection == collection)
            .map(|c| c.count)
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in &self.counts {
            writeln!(f, "{} count: {}", count.label, count.count)?;
        }
        write!(f, "{}", COMPLETION_MESSAGE)
    }
}
