use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use super::request::{HttpRequest, MultipartPart, RequestBody};
use crate::config::ClientConfig;
use crate::domain::DomainError;

/// Trait for HTTP transport operations (for mocking)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the decoded JSON body (`null` when empty)
    async fn send(&self, request: HttpRequest) -> Result<Value, DomainError>;
}

/// Real HTTP transport using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, DomainError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(DomainError::configuration(
                "Base URL must start with http:// or https://",
            ));
        }

        Self::with_timeout(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn build_form(parts: Vec<MultipartPart>) -> Result<Form, DomainError> {
    let mut form = Form::new();

    for part in parts {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File {
                name,
                file_name,
                mime,
                content,
            } => {
                let part = Part::bytes(content.to_vec())
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| DomainError::decode(format!("Invalid MIME type '{}': {}", mime, e)))?;
                form.part(name, part)
            }
        };
    }

    Ok(form)
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<Value, DomainError> {
        debug!(method = %request.method, path = %request.path, "Sending request");

        let target = request.to_string();
        let mut builder = self
            .client
            .request(request.method, self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::transport(None, format!("Request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if status == StatusCode::NOT_FOUND {
                return Err(DomainError::not_found(format!("{}: {}", target, error_body)));
            }

            return Err(DomainError::transport(
                Some(status.as_u16()),
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            DomainError::transport(Some(status.as_u16()), format!("Failed to read response: {}", e))
        })?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body)
            .map_err(|e| DomainError::decode(format!("Failed to parse response: {}", e)))
    }
}
