//! Merchant Client
//!
//! Typed client for a merchant management REST backend:
//! - Entity hydration from loosely typed JSON records
//! - Endpoint path templates with `{placeholder}` substitution
//! - Generic CRUD services with fetch-all pagination and file import
//! - Field label mappings grouped per merchant field

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AppConfig, ClientConfig};
pub use domain::DomainError;
pub use infrastructure::http::{HttpClient, HttpTransport};
pub use infrastructure::services::{
    merchant_service, EntityService, MerchantMappingService, MerchantService, Page, Services,
};

use std::sync::Arc;

/// Build the resource services over a reqwest transport for `config`
pub fn create_services(config: &ClientConfig) -> Result<Services<HttpClient>, DomainError> {
    let client = HttpClient::from_config(config)?;
    Ok(Services::new(Arc::new(client), config.page_size))
}
