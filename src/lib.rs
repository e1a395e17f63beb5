pub mod cli;
pub mod core;
pub mod providers;

use crate::core::ConversionService;
use crate::core::config::AppConfig;
use crate::providers::ExchangeRateHostProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
        offline: bool,
    },
    Rates {
        offline: bool,
    },
    Interactive,
}

pub fn build_service(config: &AppConfig) -> Result<ConversionService> {
    let provider =
        ExchangeRateHostProvider::new(&config.provider.base_url, config.provider.timeout())?;
    Ok(ConversionService::new(Arc::new(provider)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config)?;

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            offline,
        } => cli::convert::run(&service, &amount, &from, &to, offline)
            .await
            .map(|_| ()),
        AppCommand::Rates { offline } => cli::rates::run(&service, offline).await,
        AppCommand::Interactive => cli::interactive::run(&service).await,
    }
}
