//! Infrastructure layer - HTTP transport and resource services

pub mod http;
pub mod logging;
pub mod services;
