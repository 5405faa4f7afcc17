use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use inventory_core::{Environment, SeedConfig};
use inventory_seeding::{ensure_environment, run_seed, Fixtures};

#[derive(Debug, Default, Args)]
pub struct SeedArgs {
    /// Load fixtures from this JSON file instead of the built-in set
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Environment to seed (overrides APP_ENV)
    #[arg(long, short)]
    pub env: Option<String>,

    /// Allow seeding a production database
    #[arg(long)]
    pub force: bool,

    /// Print connection details to stderr before seeding
    #[arg(long, short)]
    pub verbose: bool,
}

pub async fn run(config: &SeedConfig, args: SeedArgs) -> anyhow::Result<()> {
    run_with(config, args, &mut io::stdout(), &mut io::stderr()).await
}

/// Seed, writing the summary to `out` and the verbose banner to `diag`
pub async fn run_with<O: Write, D: Write>(
    config: &SeedConfig,
    args: SeedArgs,
    out: &mut O,
    diag: &mut D,
) -> anyhow::Result<()> {
    let environment: Environment = match args.env.as_deref() {
        Some(env) => env.parse()?,
        None => config.environment.clone(),
    };
    ensure_environment(&environment, args.force)?;

    let fixture_path = args.data.as_deref().or(config.seed_file.as_deref());
    let fixtures = Fixtures::load(fixture_path)?;

    if args.verbose {
        write_banner(diag, config, &environment, fixture_path)?;
    }

    let store = inventory_store::connect(&config.mongo_uri, &config.db_name)
        .await
        .with_context(|| format!("Failed to connect to {}", config.masked_uri()))?;

    let outcome = run_seed(store.as_ref(), &fixtures).await;
    let closed = store.close().await;

    let summary = outcome.context("Seeding failed")?;
    closed.context("Failed to close the database connection")?;

    writeln!(out, "{}", summary)?;
    Ok(())
}

fn write_banner<D: Write>(
    diag: &mut D,
    config: &SeedConfig,
    environment: &Environment,
    fixture_path: Option<&Path>,
) -> io::Result<()> {
    writeln!(diag, "🌱 Database Seeding")?;
    writeln!(diag, "==================")?;
    writeln!(diag, "Environment: {}", environment.as_str())?;
    writeln!(diag, "Database URI: {}", config.masked_uri())?;
    writeln!(diag, "Database: {}", config.db_name)?;
    match fixture_path {
        Some(path) => writeln!(diag, "Fixtures: {}", path.display())?,
        None => writeln!(diag, "Fixtures: built-in")?,
    }
    writeln!(diag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verbose_banner_stays_off_stdout() {
        let config = SeedConfig::default().with_uri("memory://");
        let args = SeedArgs {
            env: Some("development".to_string()),
            verbose: true,
            ..SeedArgs::default()
        };

        let mut out = Vec::new();
        let mut diag = Vec::new();
        run_with(&config, args, &mut out, &mut diag).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sectors count: 5\n\
             Warehouses count: 5\n\
             LogDatas count: 5\n\
             Database setup completed successfully!\n"
        );
        let diag = String::from_utf8(diag).unwrap();
        assert!(diag.contains("Database Seeding"));
        assert!(diag.contains("Database URI: memory:"));
        assert!(diag.contains("Fixtures: built-in"));
    }
}
