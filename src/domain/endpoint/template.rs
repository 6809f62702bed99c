//! Endpoint path templates
//!
//! Paths carry named placeholders in braces: `/merchants/{id}`.
//! Every placeholder must be supplied when resolving; there are no defaults.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::domain::DomainError;

/// Regex to match placeholders: {name}
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// A parsed endpoint template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    /// Original template content
    template: String,
    /// Placeholder names, in order of first appearance
    placeholders: Vec<String>,
}

impl EndpointTemplate {
    /// Parse a template string and extract its placeholders
    pub fn parse(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut placeholders: Vec<String> = Vec::new();

        for cap in PLACEHOLDER_PATTERN.captures_iter(&template) {
            let name = &cap[1];

            if !placeholders.iter().any(|p| p == name) {
                placeholders.push(name.to_string());
            }
        }

        Self {
            template,
            placeholders,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Substitute every placeholder with its parameter
    pub fn resolve(&self, params: &HashMap<String, String>) -> Result<String, DomainError> {
        if let Some(missing) = self.placeholders.iter().find(|p| !params.contains_key(*p)) {
            return Err(DomainError::missing_parameter(missing, &self.template));
        }

        let resolved = PLACEHOLDER_PATTERN.replace_all(&self.template, |cap: &regex::Captures| {
            params[&cap[1]].clone()
        });

        Ok(resolved.into_owned())
    }

    /// Resolve against the scalar fields of a serializable entity
    pub fn resolve_with<T: Serialize>(&self, entity: &T) -> Result<String, DomainError> {
        self.resolve(&entity_params(entity)?)
    }
}

impl std::fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

/// Convenience function to resolve a template string directly
pub fn resolve(template: &str, params: &HashMap<String, String>) -> Result<String, DomainError> {
    EndpointTemplate::parse(template).resolve(params)
}

/// Flatten the scalar fields of an entity into template parameters.
///
/// Nested objects, arrays and nulls are skipped.
pub fn entity_params<T: Serialize>(entity: &T) -> Result<HashMap<String, String>, DomainError> {
    let Value::Object(fields) = serde_json::to_value(entity)? else {
        return Err(DomainError::decode("entity must serialize to an object"));
    };

    Ok(fields
        .into_iter()
        .filter_map(|(name, value)| scalar_to_string(&value).map(|v| (name, v)))
        .collect())
}

/// String form of a JSON scalar, or `None` for anything else
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
