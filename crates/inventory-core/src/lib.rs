//! # inventory-core
//!
//! Shared building blocks for the warehouse inventory seeder: document
//! identifiers, the three entity models, environment-driven configuration
//! and logging bootstrap.

pub mod config;
pub mod id;
pub mod logging;
pub mod model;

pub use config::{
    mask_database_url, ConfigError, ConfigSource, Environment, LogFormat, LoggingConfig,
    SeedConfig,
};
pub use id::{DocumentId, IdError};
pub use logging::init_logging;
pub use model::{ColumnSchema, Document, Entity, LogData, LogEntry, Sector, Warehouse};
