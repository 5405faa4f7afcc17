use anyhow::Context;
use inventory_core::SeedConfig;
use inventory_seeding::StatusReport;

pub async fn run(config: &SeedConfig) -> anyhow::Result<()> {
    let store = inventory_store::connect(&config.mongo_uri, &config.db_name)
        .await
        .with_context(|| format!("Failed to connect to {}", config.masked_uri()))?;

    let outcome = StatusReport::gather(store.as_ref()).await;
    let closed = store.close().await;

    let report = outcome.context("Failed to read database status")?;
    closed.context("Failed to close the database connection")?;

    println!("📊 {}", report);
    if !report.integrity.is_consistent() {
        tracing::warn!("Dangling references found between collections");
    }
    if !report.skipped.is_empty() {
        tracing::warn!(skipped = report.skipped.len(), "Some documents could not be decoded");
    }
    Ok(())
}
