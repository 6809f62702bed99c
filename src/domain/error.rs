use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Missing parameter '{name}' for endpoint template '{template}'")]
    MissingParameter { name: String, template: String },

    #[error("Transport error: {message}")]
    Transport { status: Option<u16>, message: String },

    #[error("Rejected by hook: {message}")]
    HookRejected { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DomainError {
    pub fn missing_parameter(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::MissingParameter {
            name: name.into(),
            template: template.into(),
        }
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn hook_rejected(message: impl Into<String>) -> Self {
        Self::HookRejected {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// HTTP status carried by the error, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}
