//! # inventory-seeding
//!
//! Seeds the warehouse inventory database: drops the `sectors`,
//! `warehouses` and `logdatas` collections, inserts the fixture records in
//! dependency order, creates the secondary indexes and reports counts.

pub mod error;
pub mod fixtures;
pub mod indexes;
pub mod run;
pub mod seeder;
pub mod status;
pub mod summary;

pub use error::{SeedError, SeedResult};
pub use fixtures::Fixtures;
pub use indexes::{CollectionIndex, IndexPlan};
pub use run::{ensure_environment, run_seed, seed_with};
pub use seeder::{CollectionSeeder, Seeder, SeederManager};
pub use status::{CollectionStatus, IntegrityReport, SkippedDocument, StatusReport};
pub use summary::{CollectionCount, SeedSummary};
