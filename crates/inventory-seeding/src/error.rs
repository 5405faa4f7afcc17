//! Error types for seeding runs
//!
//! Every store failure is wrapped with the step and collection it happened
//! in; nothing is retried.

use inventory_store::StoreError;
use thiserror::Error;

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to load fixtures from {origin}: {message}")]
    Fixtures { origin: String, message: String },

    #[error("Failed to drop collection '{collection}': {source}")]
    Drop {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to insert into '{collection}': {source}")]
    Insert {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to create index '{index}' on '{collection}': {source}")]
    Index {
        collection: String,
        index: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to count documents in '{collection}': {source}")]
    Count {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("Seeder dependency error: {0}")]
    Dependency(String),

    #[error("Environment '{environment}' is not safe for seeding; pass --force to drop and reseed anyway")]
    UnsafeEnvironment { environment: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
