//! MongoDB backend
//!
//! Documents arrive as extended JSON and are converted to BSON on the way in,
//! so `{"$oid": ...}` and `{"$date": ...}` become native ObjectIds and dates.

use async_trait::async_trait;
use bson::{doc, Bson};
use futures::TryStreamExt;
use inventory_core::{mask_database_url, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde_json::Value;

use crate::{Backend, DocumentStore, IndexSpec, SortDirection, StoreError, StoreResult};

const NAMESPACE_NOT_FOUND: i32 = 26;
const DUPLICATE_KEY: i32 = 11000;

/// [`DocumentStore`] backed by the official MongoDB driver
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a `ping`
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(|e| {
            StoreError::Connection(format!("{}: {}", mask_database_url(uri), e))
        })?;

        let store = Self {
            db: client.database(database),
            client,
        };

        store
            .ping()
            .await
            .map_err(|e| StoreError::Connection(format!("{}: {}", mask_database_url(uri), e)))?;

        tracing::info!(uri = %mask_database_url(uri), database, "Connected to MongoDB");
        Ok(store)
    }

    fn collection(&self, name: &str) -> Collection<bson::Document> {
        self.db.collection::<bson::Document>(name)
    }
}

fn to_bson_document(document: Document) -> StoreResult<bson::Document> {
    match Bson::try_from(Value::Object(document))? {
        Bson::Document(doc) => Ok(doc),
        other => Err(StoreError::Serialization(format!(
            "expected a document, got {:?}",
            other.element_type()
        ))),
    }
}

fn to_json_document(document: bson::Document) -> StoreResult<Document> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn is_namespace_not_found(err: &mongodb::error::Error) -> bool {
    matches!(*err.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_NOT_FOUND)
}

/// First duplicate-key message carried by a write error, if any
fn duplicate_key_message(err: &mongodb::error::Error) -> Option<String> {
    match *err.kind {
        ErrorKind::BulkWrite(ref failure) => failure
            .write_errors
            .as_ref()?
            .iter()
            .find(|e| e.code == DUPLICATE_KEY)
            .map(|e| e.message.clone()),
        ErrorKind::Write(WriteFailure::WriteError(ref write)) if write.code == DUPLICATE_KEY => {
            Some(write.message.clone())
        }
        _ => None,
    }
}

fn index_from_model(model: &IndexModel) -> Option<IndexSpec> {
    let (field, value) = model.keys.iter().next()?;
    let direction = match value {
        Bson::Int32(v) => SortDirection::from_i64(i64::from(*v)),
        Bson::Int64(v) => SortDirection::from_i64(*v),
        Bson::Double(v) => SortDirection::from_i64(*v as i64),
        _ => None,
    }?;

    let unique = field == "_id"
        || model
            .options
            .as_ref()
            .and_then(|o| o.unique)
            .unwrap_or(false);

    Some(IndexSpec {
        field: field.clone(),
        direction,
        unique,
    })
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> Backend {
        Backend::MongoDb
    }

    fn database(&self) -> &str {
        self.db.name()
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        match self.collection(collection).drop(None).await {
            Ok(()) => Ok(()),
            Err(e) if is_namespace_not_found(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let documents = documents
            .into_iter()
            .map(to_bson_document)
            .collect::<StoreResult<Vec<_>>>()?;

        let result = self
            .collection(collection)
            .insert_many(documents, None)
            .await
            .map_err(|e| match duplicate_key_message(&e) {
                Some(key) => StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    key,
                },
                None => e.into(),
            })?;

        Ok(result.inserted_ids.len())
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<String> {
        let options = IndexOptions::builder()
            .name(index.name())
            .unique(index.unique)
            .build();
        let model = IndexModel::builder()
            .keys(doc! { index.field.as_str(): index.direction.as_i32() })
            .options(options)
            .build();

        let result = self.collection(collection).create_index(model, None).await?;
        Ok(result.index_name)
    }

    async fn list_indexes(&self, collection: &str) -> StoreResult<Vec<IndexSpec>> {
        let cursor = match self.collection(collection).list_indexes(None).await {
            Ok(cursor) => cursor,
            Err(e) if is_namespace_not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let models: Vec<IndexModel> = cursor.try_collect().await?;
        Ok(models.iter().filter_map(index_from_model).collect())
    }

    async fn count_documents(&self, collection: &str) -> StoreResult<u64> {
        Ok(self.collection(collection).count_documents(doc! {}, None).await?)
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let cursor = self.collection(collection).find(None, None).await?;
        let documents: Vec<bson::Document> = cursor.try_collect().await?;
        documents.into_iter().map(to_json_document).collect()
    }

    async fn close(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;
        tracing::debug!("MongoDB client shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are objects"),
        }
    }

    #[test]
    fn test_extended_json_becomes_native_bson() {
        let converted = to_bson_document(doc(json!({
            "_id": { "$oid": "65cba1a123456789abcd0001" },
            "logData": { "day": { "$date": "2024-02-13T08:00:00.000Z" }, "1": 120.0 }
        })))
        .unwrap();

        assert_eq!(
            converted.get_object_id("_id").unwrap(),
            ObjectId::parse_str("65cba1a123456789abcd0001").unwrap()
        );
        let log_data = converted.get_document("logData").unwrap();
        assert!(log_data.get_datetime("day").is_ok());
        assert_eq!(log_data.get_f64("1").unwrap(), 120.0);
    }

    #[test]
    fn test_bson_back_to_extended_json() {
        let original = doc(json!({
            "_id": { "$oid": "65cba1a123456789abcd0001" },
            "name": "Sector 1",
            "deleted": false
        }));
        let round = to_json_document(to_bson_document(original.clone()).unwrap()).unwrap();
        assert_eq!(round, original);
    }

    #[test]
    fn test_index_from_model() {
        let model = IndexModel::builder().keys(doc! { "creator": 1 }).build();
        assert_eq!(index_from_model(&model), Some(IndexSpec::ascending("creator")));

        let primary = IndexModel::builder().keys(doc! { "_id": 1 }).build();
        assert_eq!(index_from_model(&primary), Some(IndexSpec::primary()));

        let text = IndexModel::builder().keys(doc! { "name": "text" }).build();
        assert_eq!(index_from_model(&text), None);
    }

    // Needs a running server: MONGO_URI=mongodb://localhost:27017/ cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_live_roundtrip() {
        let uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017/".to_string());
        let store = MongoStore::connect(&uri, "inventory_store_test").await.unwrap();

        store.drop_collection("sectors").await.unwrap();
        store.drop_collection("sectors").await.unwrap();
        store
            .insert_many(
                "sectors",
                vec![doc(json!({ "_id": { "$oid": "65cba1a123456789abcd0001" }, "name": "Sector 1" }))],
            )
            .await
            .unwrap();

        let err = store
            .insert_many(
                "sectors",
                vec![doc(json!({ "_id": { "$oid": "65cba1a123456789abcd0001" } }))],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));

        store
            .create_index("sectors", &IndexSpec::ascending("creator"))
            .await
            .unwrap();
        let indexes = store.list_indexes("sectors").await.unwrap();
        assert!(indexes.contains(&IndexSpec::ascending("creator")));
        assert!(indexes.contains(&IndexSpec::primary()));
        assert_eq!(store.count_documents("sectors").await.unwrap(), 1);

        store.drop_collection("sectors").await.unwrap();
        store.close().await.unwrap();
    }
}
