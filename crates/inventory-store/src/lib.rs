//! # inventory-store
//!
//! A small document-store seam. The seeder talks to [`DocumentStore`] and
//! never to a driver directly; [`connect`] picks the backend from the URI
//! scheme.

pub mod error;
pub mod index;
pub mod memory;
pub mod mongo;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use inventory_core::{mask_database_url, Document};
use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use index::{IndexSpec, SortDirection};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use postgres::PostgresStore;

/// Which driver sits behind a store handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MongoDb,
    Postgres,
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::MongoDb => write!(f, "mongodb"),
            Backend::Postgres => write!(f, "postgres"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

/// Operations the seeder needs from a document database.
///
/// Shared semantics across backends:
/// - dropping a collection that does not exist succeeds
/// - inserting a document whose `_id` already exists fails with
///   [`StoreError::DuplicateKey`]
/// - every collection reports the implicit `_id_` index
/// - creating an index identical to an existing one is a no-op, while a
///   different spec under the same name fails with [`StoreError::IndexConflict`]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// Logical database this handle is bound to
    fn database(&self) -> &str;

    async fn ping(&self) -> StoreResult<()>;

    async fn drop_collection(&self, collection: &str) -> StoreResult<()>;

    /// Insert documents in order, returning how many were written
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<usize>;

    /// Create an index, returning its name
    async fn create_index(&self, collection: &str, index: &IndexSpec) -> StoreResult<String>;

    async fn list_indexes(&self, collection: &str) -> StoreResult<Vec<IndexSpec>>;

    async fn count_documents(&self, collection: &str) -> StoreResult<u64>;

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Release the underlying connection
    async fn close(&self) -> StoreResult<()>;
}

/// Open a store for `uri`, bound to the logical database `database`
pub async fn connect(uri: &str, database: &str) -> StoreResult<Box<dyn DocumentStore>> {
    let scheme = uri
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| StoreError::InvalidUri(mask_database_url(uri)))?;

    tracing::debug!(backend = %scheme, database, "Opening document store");

    match scheme.as_str() {
        "mongodb" | "mongodb+srv" => Ok(Box::new(MongoStore::connect(uri, database).await?)),
        "postgres" | "postgresql" => Ok(Box::new(PostgresStore::connect(uri, database).await?)),
        "memory" => Ok(Box::new(MemoryStore::new(database))),
        _ => Err(StoreError::UnsupportedScheme { scheme }),
    }
}

/// The `_id` of a document as a plain string, unwrapping `{"$oid": ...}`
pub fn document_id(document: &Document) -> Option<String> {
    match document.get("_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(oid)) => Some(oid.clone()),
            _ => Some(Value::Object(map.clone()).to_string()),
        },
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Collection, schema and field names must be plain identifiers
pub(crate) fn check_name(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
