//! Error types for document store operations

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid database URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported database URI scheme '{scheme}', expected mongodb, postgres or memory")]
    UnsupportedScheme { scheme: String },

    #[error("Invalid identifier '{0}': only letters, digits and underscores are allowed")]
    InvalidName(String),

    #[error("Duplicate key in collection '{collection}': {key}")]
    DuplicateKey { collection: String, key: String },

    #[error("Document in collection '{collection}' has no _id")]
    MissingId { collection: String },

    #[error("Index '{name}' already exists on '{collection}' with different options")]
    IndexConflict { collection: String, name: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<bson::extjson::de::Error> for StoreError {
    fn from(err: bson::extjson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
