//! Process-local store used by tests and dry runs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use inventory_core::Document;
use tokio::sync::RwLock;

use crate::{document_id, Backend, DocumentStore, IndexSpec, StoreError, StoreResult};

#[derive(Debug, Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    ids: HashSet<String>,
    indexes: Vec<IndexSpec>,
}

impl MemoryCollection {
    fn new() -> Self {
        Self {
            indexes: vec![IndexSpec::primary()],
            ..Self::default()
        }
    }
}

/// In-memory [`DocumentStore`] with MongoDB-like semantics
#[derive(Debug)]
pub struct MemoryStore {
    database: String,
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Names of the collections that currently exist, sorted
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        let existed = self.collections.write().await.remove(collection).is_some();
        tracing::debug!(collection, existed, "Dropped in-memory collection");
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<usize> {
        let mut collections = self.collections.write().await;
        let target = collections
            .entry(collection.to_string())
            .or_insert_with(MemoryCollection::new);

        // Ordered insert: stop at the first failure, keeping what came before.
        let mut inserted = 0;
        for document in documents {
            let id = document_id(&document).ok_or_else(|| StoreError::MissingId {
                collection: collection.to_string(),
            })?;

            if !target.ids.insert(id.clone()) {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    key: format!("_id {}", id),
                });
            }

            target.documents.push(document);
            inserted += 1;
        }

        Ok(inserted)
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<String> {
        let mut collections = self.collections.write().await;
        let target = collections
            .entry(collection.to_string())
            .or_insert_with(MemoryCollection::new);

        let name = index.name();
        match target.indexes.iter().find(|existing| existing.name() == name) {
            Some(existing) if existing == index => {}
            Some(_) => {
                return Err(StoreError::IndexConflict {
                    collection: collection.to_string(),
                    name,
                })
            }
            None => target.indexes.push(index.clone()),
        }

        Ok(name)
    }

    async fn list_indexes(&self, collection: &str) -> StoreResult<Vec<IndexSpec>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default())
    }

    async fn count_documents(&self, collection: &str) -> StoreResult<u64> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.documents.len() as u64)
            .unwrap_or(0))
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are objects"),
        }
    }

    #[tokio::test]
    async fn test_insert_count_and_find() {
        let store = MemoryStore::new("test");
        let inserted = store
            .insert_many(
                "sectors",
                vec![
                    doc(json!({ "_id": { "$oid": "65cba1a123456789abcd0001" }, "name": "Sector 1" })),
                    doc(json!({ "_id": { "$oid": "65cba1a123456789abcd0002" }, "name": "Sector 2" })),
                ],
            )
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.count_documents("sectors").await.unwrap(), 2);

        let found = store.find_all("sectors").await.unwrap();
        assert_eq!(found[0]["name"], json!("Sector 1"));
        assert_eq!(found[1]["name"], json!("Sector 2"));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let store = MemoryStore::new("test");
        let err = store
            .insert_many(
                "sectors",
                vec![
                    doc(json!({ "_id": "a" })),
                    doc(json!({ "_id": "b" })),
                    doc(json!({ "_id": "a" })),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        // ordered semantics: documents before the failure remain
        assert_eq!(store.count_documents("sectors").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_id_is_rejected() {
        let store = MemoryStore::new("test");
        let err = store
            .insert_many("sectors", vec![doc(json!({ "name": "no id" }))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId { .. }));
    }

    #[tokio::test]
    async fn test_drop_is_idempotent() {
        let store = MemoryStore::new("test");
        store.drop_collection("missing").await.unwrap();

        store
            .insert_many("warehouses", vec![doc(json!({ "_id": "w1" }))])
            .await
            .unwrap();
        store.drop_collection("warehouses").await.unwrap();
        store.drop_collection("warehouses").await.unwrap();

        assert_eq!(store.count_documents("warehouses").await.unwrap(), 0);
        assert!(store.collection_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_indexes() {
        let store = MemoryStore::new("test");
        assert!(store.list_indexes("logdatas").await.unwrap().is_empty());

        let name = store
            .create_index("logdatas", &IndexSpec::ascending("warehouse"))
            .await
            .unwrap();
        assert_eq!(name, "warehouse_1");

        // identical spec is a no-op
        store
            .create_index("logdatas", &IndexSpec::ascending("warehouse"))
            .await
            .unwrap();

        let err = store
            .create_index("logdatas", &IndexSpec::ascending("warehouse").unique())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexConflict { .. }));

        let indexes = store.list_indexes("logdatas").await.unwrap();
        assert_eq!(indexes, vec![IndexSpec::primary(), IndexSpec::ascending("warehouse")]);
    }
}
