//! Entity models for the `sectors`, `warehouses` and `logdatas` collections

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{extended_date, DocumentId};

/// A stored document: a JSON object in extended JSON form
pub type Document = serde_json::Map<String, Value>;

/// Common behaviour of everything that lives in a collection
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection the entity is stored in
    const COLLECTION: &'static str;

    /// Convert into a store document
    fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "{} entity serialized to a non-object value: {}",
                Self::COLLECTION,
                other
            ))),
        }
    }

    /// Read an entity back from a store document
    fn from_document(document: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(document))
    }
}

/// A named organizational or geographic grouping of warehouses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub creator: DocumentId,
    pub location: String,
    #[serde(default)]
    pub deleted: bool,
}

impl Entity for Sector {
    const COLLECTION: &'static str = "sectors";
}

/// One measurable column of a warehouse inventory sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    pub title: String,
    pub data_index: String,
    pub data_type: String,
}

/// A tracked facility with its own column schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    pub creator: DocumentId,
    pub sector: DocumentId,
    pub columns: Vec<ColumnSchema>,
}

impl Warehouse {
    /// Columns that carry measurements, i.e. everything except the `day` stamp
    pub fn measurement_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter().filter(|c| c.data_index != LogData::DAY_KEY)
    }
}

impl Entity for Warehouse {
    const COLLECTION: &'static str = "warehouses";
}

/// A timestamped measurement snapshot keyed by column data index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogData {
    #[serde(with = "extended_date")]
    pub day: DateTime<Utc>,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl LogData {
    pub const DAY_KEY: &'static str = "day";
}

/// A single log entry for one warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub warehouse: DocumentId,
    pub creator: DocumentId,
    #[serde(rename = "logData")]
    pub log_data: LogData,
}

impl Entity for LogEntry {
    const COLLECTION: &'static str = "logdatas";
}
