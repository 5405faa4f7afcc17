mod commands;

use clap::{Parser, Subcommand};
use inventory_core::{init_logging, SeedConfig};

use commands::seed::SeedArgs;

#[derive(Parser)]
#[command(name = "inventory-seed")]
#[command(version, about = "Seed the warehouse inventory database with sample sectors, warehouses and logs")]
struct Cli {
    /// Database URI (overrides MONGO_URI)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Database name (overrides DB_NAME)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and reseed the sectors, warehouses and logdatas collections (default)
    Seed(SeedArgs),

    /// Show document counts, indexes and reference checks
    Status,
}

impl Cli {
    fn config(&self) -> anyhow::Result<SeedConfig> {
        let mut config = SeedConfig::from_env()?;
        if let Some(uri) = &self.uri {
            config = config.with_uri(uri.clone());
        }
        if let Some(database) = &self.database {
            config = config.with_database(database.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config()?;
    init_logging(&config.logging)?;

    tracing::debug!(sources = ?config.config_sources(), "Configuration loaded");

    match cli.command.unwrap_or_else(|| Commands::Seed(SeedArgs::default())) {
        Commands::Seed(args) => commands::seed::run(&config, args).await?,
        Commands::Status => commands::status::run(&config).await?,
    }

    Ok(())
}
