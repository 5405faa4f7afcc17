//! Read-only database overview
//!
//! Counts, indexes, sample documents and reference checks across the three
//! collections. This never modifies the store and never blocks a seed run.
//! Documents that do not decode are listed and left out of the checks.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use inventory_core::{Document, DocumentId, Entity, LogEntry, Sector, Warehouse};
use inventory_store::{document_id, Backend, DocumentStore, IndexSpec};
use serde_json::Value;

use crate::error::SeedResult;
use crate::summary::SeedSummary;

/// Count and indexes of one collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatus {
    pub collection: String,
    pub count: u64,
    pub indexes: Vec<IndexSpec>,
    /// First stored document, as returned by the store
    pub sample: Option<Document>,
}

/// Dangling references found between the collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Warehouses whose `sector` matches no sector
    pub orphan_warehouses: Vec<DocumentId>,
    /// Log entries whose `warehouse` matches no warehouse
    pub orphan_logs: Vec<DocumentId>,
    /// Log entries whose keys are not among the warehouse's columns
    pub unknown_log_keys: Vec<(DocumentId, String)>,
}

impl IntegrityReport {
    pub fn check(sectors: &[Sector], warehouses: &[Warehouse], logs: &[LogEntry]) -> Self {
        let sector_ids: HashSet<DocumentId> = sectors.iter().map(|s| s.id).collect();

        let orphan_warehouses = warehouses
            .iter()
            .filter(|w| !sector_ids.contains(&w.sector))
            .map(|w| w.id)
            .collect();

        let mut orphan_logs = Vec::new();
        let mut unknown_log_keys = Vec::new();
        for entry in logs {
            let Some(warehouse) = warehouses.iter().find(|w| w.id == entry.warehouse) else {
                orphan_logs.push(entry.id);
                continue;
            };

            let columns: HashSet<&str> = warehouse
                .measurement_columns()
                .map(|c| c.data_index.as_str())
                .collect();
            for key in entry.log_data.values.keys() {
                if !columns.contains(key.as_str()) {
                    unknown_log_keys.push((entry.id, key.clone()));
                }
            }
        }

        Self {
            orphan_warehouses,
            orphan_logs,
            unknown_log_keys,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.orphan_warehouses.is_empty()
            && self.orphan_logs.is_empty()
            && self.unknown_log_keys.is_empty()
    }
}

/// A stored document that could not be read as its entity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub collection: String,
    /// `_id` of the document, when it has one
    pub id: Option<String>,
    pub reason: String,
}

/// Snapshot of the seeded database
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub backend: Backend,
    pub database: String,
    pub collections: Vec<CollectionStatus>,
    pub integrity: IntegrityReport,
    /// Non-deleted sectors per creator
    pub active_sectors_by_creator: BTreeMap<DocumentId, usize>,
    /// Warehouses per sector; every known sector is listed, even when empty
    pub warehouses_by_sector: BTreeMap<DocumentId, usize>,
    /// Documents left out of the tallies and integrity checks
    pub skipped: Vec<SkippedDocument>,
}

impl StatusReport {
    pub async fn gather(store: &dyn DocumentStore) -> SeedResult<Self> {
        store.ping().await?;

        let mut collections = Vec::with_capacity(SeedSummary::REPORTED.len());
        let mut documents: HashMap<&str, Vec<Document>> = HashMap::new();
        for (_, collection) in SeedSummary::REPORTED {
            let found = store.find_all(collection).await?;
            collections.push(CollectionStatus {
                collection: collection.to_string(),
                count: store.count_documents(collection).await?,
                indexes: store.list_indexes(collection).await?,
                sample: found.first().cloned(),
            });
            documents.insert(collection, found);
        }

        let mut skipped = Vec::new();
        let sectors: Vec<Sector> = decode(&mut documents, &mut skipped);
        let warehouses: Vec<Warehouse> = decode(&mut documents, &mut skipped);
        let logs: Vec<LogEntry> = decode(&mut documents, &mut skipped);

        let mut active_sectors_by_creator = BTreeMap::new();
        for sector in sectors.iter().filter(|s| !s.deleted) {
            *active_sectors_by_creator.entry(sector.creator).or_insert(0) += 1;
        }

        let mut warehouses_by_sector: BTreeMap<DocumentId, usize> =
            sectors.iter().map(|s| (s.id, 0)).collect();
        for warehouse in &warehouses {
            *warehouses_by_sector.entry(warehouse.sector).or_insert(0) += 1;
        }

        Ok(Self {
            backend: store.backend(),
            database: store.database().to_string(),
            collections,
            integrity: IntegrityReport::check(&sectors, &warehouses, &logs),
            active_sectors_by_creator,
            warehouses_by_sector,
            skipped,
        })
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionStatus> {
        self.collections.iter().find(|c| c.collection == name)
    }
}

/// Decode one collection, setting aside documents of the wrong shape
fn decode<E: Entity>(
    documents: &mut HashMap<&str, Vec<Document>>,
    skipped: &mut Vec<SkippedDocument>,
) -> Vec<E> {
    let mut entities = Vec::new();
    for document in documents.remove(E::COLLECTION).unwrap_or_default() {
        let id = document_id(&document);
        match E::from_document(document) {
            Ok(entity) => entities.push(entity),
            Err(e) => {
                tracing::warn!(
                    collection = E::COLLECTION,
                    id = id.as_deref().unwrap_or("-"),
                    error = %e,
                    "Skipping undecodable document"
                );
                skipped.push(SkippedDocument {
                    collection: E::COLLECTION.to_string(),
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
    entities
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database: {} ({})", self.database, self.backend)?;
        writeln!(f)?;
        writeln!(f, "Collections:")?;
        for status in &self.collections {
            let indexes: Vec<String> = status.indexes.iter().map(|i| i.to_string()).collect();
            writeln!(
                f,
                "  {:<11} {:>5} documents  indexes: {}",
                status.collection,
                status.count,
                if indexes.is_empty() { "-".to_string() } else { indexes.join(", ") }
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Samples:")?;
        for status in &self.collections {
            match &status.sample {
                Some(sample) => writeln!(f, "  {}: {}", status.collection, Value::Object(sample.clone()))?,
                None => writeln!(f, "  {}: (empty)", status.collection)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Active sectors by creator:")?;
        if self.active_sectors_by_creator.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (creator, count) in &self.active_sectors_by_creator {
            writeln!(f, "  {}: {}", creator, count)?;
        }

        writeln!(f)?;
        writeln!(f, "Warehouses by sector:")?;
        if self.warehouses_by_sector.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (sector, count) in &self.warehouses_by_sector {
            writeln!(f, "  {}: {}", sector, count)?;
        }

        if !self.skipped.is_empty() {
            writeln!(f)?;
            writeln!(f, "Skipped documents: {}", self.skipped.len())?;
            for doc in &self.skipped {
                writeln!(
                    f,
                    "  {} {}: {}",
                    doc.collection,
                    doc.id.as_deref().unwrap_or("(no _id)"),
                    doc.reason
                )?;
            }
        }

        writeln!(f)?;
        let integrity = &self.integrity;
        writeln!(f, "Integrity:")?;
        writeln!(f, "  warehouses with unknown sector:      {}", integrity.orphan_warehouses.len())?;
        writeln!(f, "  log entries with unknown warehouse:  {}", integrity.orphan_logs.len())?;
        write!(f, "  log values outside warehouse columns: {}", integrity.unknown_log_keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Fixtures;

    #[test]
    fn test_embedded_fixtures_are_consistent() {
        let fixtures = Fixtures::embedded().unwrap();
        let report = IntegrityReport::check(&fixtures.sectors, &fixtures.warehouses, &fixtures.logdatas);
        assert!(report.is_consistent(), "{:?}", report);
    }

    #[test]
    fn test_detects_dangling_references() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut warehouses = fixtures.warehouses.clone();
        warehouses[0].sector = "65cba1a1234567890000ffff".parse().unwrap();
        let mut logs = fixtures.logdatas.clone();
        logs[1].warehouse = "65cbb2b1234567890000ffff".parse().unwrap();
        logs[2].log_data.values.insert("99".to_string(), 1.0);

        let report = IntegrityReport::check(&fixtures.sectors, &warehouses, &logs);
        assert_eq!(report.orphan_warehouses, vec![warehouses[0].id]);
        assert_eq!(report.orphan_logs, vec![logs[1].id]);
        assert_eq!(report.unknown_log_keys, vec![(logs[2].id, "99".to_string())]);
        assert!(!report.is_consistent());
    }
}
