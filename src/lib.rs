pub mod cli;
pub mod converter;
pub mod core;
pub mod providers;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub use crate::converter::Converter;
pub use crate::core::{ConversionState, RateBook, RateMapping, RateProvider};

pub enum AppCommand {
    Session,
    Convert {
        amount: f64,
        from: String,
        to: String,
    },
    Currencies {
        base: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let base_url = config
        .provider
        .as_ref()
        .map_or(providers::currency_api::DEFAULT_BASE_URL, |p| &p.base_url);
    let provider: Arc<dyn RateProvider> =
        Arc::new(providers::currency_api::CurrencyApiProvider::new(base_url));

    match command {
        AppCommand::Session => cli::session::run(provider, &config).await,
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(provider.as_ref(), amount, &from, &to).await
        }
        AppCommand::Currencies { base } => {
            let base = base.unwrap_or_else(|| config.source.clone());
            cli::currencies::run(provider.as_ref(), &base).await
        }
    }
}
