use anyhow::Result;
use clap::{Parser, Subcommand};
use fxc::core::log::init_logging;

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

impl From<Commands> for fxc::AppCommand {
    fn from(cmd: Commands) -> fxc::AppCommand {
        match cmd {
            Commands::Session => fxc::AppCommand::Session,
            Commands::Convert { amount, from, to } => fxc::AppCommand::Convert { amount, from, to },
            Commands::Currencies { base } => fxc::AppCommand::Currencies { base },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start the interactive converter (the default)
    Session,
    /// Convert an amount between two currencies
    Convert {
        /// Amount in the source currency
        amount: f64,
        /// Source currency code, e.g. "usd"
        from: String,
        /// Target currency code, e.g. "pkr"
        to: String,
    },
    /// List known currencies and their rates for a base
    Currencies {
        /// Base currency code; defaults to the configured source
        base: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fxc::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => fxc::run_command(fxc::AppCommand::Session, cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = fxc::core::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
source: "usd"
target: "pkr"

provider:
  base_url: "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
