//! CLI module for the merchant client
//!
//! Subcommands talk to the configured REST backend and print JSON to stdout:
//! - `mappings`: grouped field label mappings
//! - `merchants`: merchant listing, bulk deletion and file import

pub mod mappings;
pub mod merchants;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::create_services;
use crate::infrastructure::http::HttpClient;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::services::Services;

/// Merchant client - manage merchants and their field label mappings
#[derive(Parser)]
#[command(name = "merchant-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Field label mappings
    #[command(subcommand)]
    Mappings(mappings::MappingsCommand),

    /// Merchants
    #[command(subcommand)]
    Merchants(merchants::MerchantsCommand),
}

/// Load configuration, install logging and build the HTTP-backed services
pub fn bootstrap() -> anyhow::Result<Services<HttpClient>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let services = create_services(&config.client)?;
    debug!(
        base_url = %config.client.base_url,
        page_size = config.client.page_size,
        "Services ready"
    );

    Ok(services)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
