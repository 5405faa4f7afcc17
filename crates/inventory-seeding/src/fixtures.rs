//! Sample records for the three collections
//!
//! The default set is `data/fixtures.json`, compiled into the binary. An
//! external file with the same shape can replace it.

use std::fs;
use std::path::Path;

use inventory_core::{LogEntry, Sector, Warehouse};
use serde::{Deserialize, Serialize};

use crate::error::{SeedError, SeedResult};

const EMBEDDED_FIXTURES: &str = include_str!("../data/fixtures.json");

/// Typed fixture records, one list per collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixtures {
    pub sectors: Vec<Sector>,
    pub warehouses: Vec<Warehouse>,
    pub logdatas: Vec<LogEntry>,
}

impl Fixtures {
    /// The fixture set shipped with the crate
    pub fn embedded() -> SeedResult<Self> {
        Self::parse(EMBEDDED_FIXTURES, "embedded fixtures")
    }

    /// Load fixtures from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> SeedResult<Self> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|e| SeedError::Fixtures {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&raw, &origin)
    }

    /// `from_path` when a path is given, otherwise the embedded set
    pub fn load(path: Option<&Path>) -> SeedResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    fn parse(raw: &str, origin: &str) -> SeedResult<Self> {
        let fixtures: Fixtures = serde_json::from_str(raw).map_err(|e| SeedError::Fixtures {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            origin,
            sectors = fixtures.sectors.len(),
            warehouses = fixtures.warehouses.len(),
            logdatas = fixtures.logdatas.len(),
            "Loaded fixtures"
        );
        Ok(fixtures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::Entity;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn test_embedded_fixture_counts() {
        let fixtures = Fixtures::embedded().unwrap();
        assert_eq!(fixtures.sectors.len(), 5);
        assert_eq!(fixtures.warehouses.len(), 5);
        assert_eq!(fixtures.logdatas.len(), 5);
    }

    #[test]
    fn test_embedded_ids_are_unique() {
        let fixtures = Fixtures::embedded().unwrap();
        let sectors: HashSet<_> = fixtures.sectors.iter().map(|s| s.id).collect();
        let warehouses: HashSet<_> = fixtures.warehouses.iter().map(|w| w.id).collect();
        let logs: HashSet<_> = fixtures.logdatas.iter().map(|l| l.id).collect();
        assert_eq!(sectors.len(), 5);
        assert_eq!(warehouses.len(), 5);
        assert_eq!(logs.len(), 5);
    }

    #[test]
    fn test_embedded_references_resolve() {
        let fixtures = Fixtures::embedded().unwrap();
        let sectors: HashSet<_> = fixtures.sectors.iter().map(|s| s.id).collect();
        let warehouses: HashSet<_> = fixtures.warehouses.iter().map(|w| w.id).collect();

        assert!(fixtures.warehouses.iter().all(|w| sectors.contains(&w.sector)));
        assert!(fixtures.logdatas.iter().all(|l| warehouses.contains(&l.warehouse)));
    }

    #[test]
    fn test_log_keys_match_warehouse_columns() {
        let fixtures = Fixtures::embedded().unwrap();
        for entry in &fixtures.logdatas {
            let warehouse = fixtures
                .warehouses
                .iter()
                .find(|w| w.id == entry.warehouse)
                .unwrap();
            let columns: HashSet<_> = warehouse
                .measurement_columns()
                .map(|c| c.data_index.as_str())
                .collect();
            let keys: HashSet<_> = entry.log_data.values.keys().map(String::as_str).collect();
            assert_eq!(columns, keys, "log entry {} vs warehouse {}", entry.id, warehouse.name);
        }
    }

    #[test]
    fn test_sector_one_belongs_to_first_creator() {
        let fixtures = Fixtures::embedded().unwrap();
        let sector = &fixtures.sectors[0];
        assert_eq!(sector.name, "Sector 1");
        assert_eq!(sector.id.to_hex(), "65cba1a123456789abcd0001");
        assert_eq!(sector.creator.to_hex(), "65cb123456789abcd000a001");
        assert!(!sector.deleted);
    }

    #[test]
    fn test_documents_carry_extended_ids() {
        let fixtures = Fixtures::embedded().unwrap();
        let doc = fixtures.warehouses[0].to_document().unwrap();
        assert_eq!(
            doc["sector"],
            serde_json::json!({ "$oid": "65cba1a123456789abcd0001" })
        );
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sectors": [{{
                    "_id": "65cba1a123456789abcd00ff",
                    "name": "Overflow",
                    "creator": "65cb123456789abcd000a001",
                    "location": "Annex"
                }}],
                "warehouses": [],
                "logdatas": []
            }}"#
        )
        .unwrap();

        let fixtures = Fixtures::load(Some(file.path())).unwrap();
        assert_eq!(fixtures.sectors.len(), 1);
        assert_eq!(fixtures.sectors[0].name, "Overflow");
        assert!(fixtures.warehouses.is_empty());
    }

    #[test]
    fn test_bad_fixture_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sectors": [{{ "_id": "short" }}] }}"#).unwrap();

        let err = Fixtures::from_path(file.path()).unwrap_err();
        assert!(matches!(err, SeedError::Fixtures { .. }));

        let err = Fixtures::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SeedError::Fixtures { .. }));
    }
}
