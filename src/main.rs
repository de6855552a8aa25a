use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratesync::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch rates for the configured currencies and upsert them
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Sync) => sync(cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

async fn sync(config_path: Option<&str>) -> Result<()> {
    let summary = ratesync::run(config_path).await?;

    if summary.succeeded == 0 {
        tracing::error!(attempted = summary.attempted, "No currency synced");
    } else if summary.failed() > 0 {
        tracing::warn!(
            succeeded = summary.succeeded,
            failed = summary.failed(),
            "Some currencies failed to sync"
        );
    }
    Ok(())
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = ratesync::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
currency:
  - USD
  - EUR

provider:
  base_url: "https://xecdapi.xe.com"

database:
  url: "postgres://localhost/rates"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
