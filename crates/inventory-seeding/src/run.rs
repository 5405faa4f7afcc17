//! The seed run: drop, insert, index, count

use inventory_core::Environment;
use inventory_store::DocumentStore;

use crate::error::{SeedError, SeedResult};
use crate::fixtures::Fixtures;
use crate::indexes::IndexPlan;
use crate::seeder::SeederManager;
use crate::summary::SeedSummary;

/// Refuse to drop collections in production unless forced
pub fn ensure_environment(environment: &Environment, force: bool) -> SeedResult<()> {
    if environment.is_safe_for_seeding() {
        return Ok(());
    }

    if !force {
        return Err(SeedError::UnsafeEnvironment {
            environment: environment.as_str().to_string(),
        });
    }

    tracing::warn!(
        environment = environment.as_str(),
        "Force seeding: existing collections will be dropped"
    );
    Ok(())
}

/// Seed `store` with `fixtures` and the standard index plan
pub async fn run_seed(store: &dyn DocumentStore, fixtures: &Fixtures) -> SeedResult<SeedSummary> {
    let manager = SeederManager::from_fixtures(fixtures)?;
    seed_with(store, &manager, &IndexPlan::standard()).await
}

/// Drop every managed collection, run the seeders, create indexes and count.
/// The first failing step aborts the run; earlier steps are not undone.
pub async fn seed_with(
    store: &dyn DocumentStore,
    manager: &SeederManager,
    plan: &IndexPlan,
) -> SeedResult<SeedSummary> {
    tracing::info!(
        backend = %store.backend(),
        database = store.database(),
        "Seeding database"
    );

    manager.reset_all(store).await?;
    manager.run_all(store).await?;
    let indexes = plan.apply(store).await?;
    let summary = SeedSummary::collect(store, indexes).await?;

    tracing::info!(indexes = summary.indexes.len(), "Seeding finished");
    Ok(summary)
}
