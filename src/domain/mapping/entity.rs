//! Merchant mapping entity and its grouped view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entity::Entity;
use crate::domain::DomainError;

/// One placeholder → label substitution rule for a merchant field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MerchantMapping {
    pub id: u64,
    /// Merchant field the rule applies to, e.g. `valid_time`
    #[validate(length(min = 1, max = 100))]
    pub field_name: String,
    #[validate(length(min = 1, max = 100))]
    pub placeholder: String,
    #[validate(length(min = 1, max = 500))]
    pub display_text: String,
    pub label_id: i64,
    pub is_active: bool,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl Default for MerchantMapping {
    fn default() -> Self {
        Self {
            id: 0,
            field_name: String::new(),
            placeholder: String::new(),
            display_text: String::new(),
            label_id: 0,
            is_active: true,
            created: None,
            updated: None,
        }
    }
}

impl Entity for MerchantMapping {
    const NAME: &'static str = "merchant mapping";

    fn id(&self) -> u64 {
        self.id
    }
}

impl MerchantMapping {
    pub fn new(
        field_name: impl Into<String>,
        placeholder: impl Into<String>,
        display_text: impl Into<String>,
        label_id: i64,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            placeholder: placeholder.into(),
            display_text: display_text.into(),
            label_id,
            ..Self::default()
        }
    }

    /// The grouped-view entry for this record
    pub fn label(&self) -> LabelMapping {
        LabelMapping {
            placeholder: self.placeholder.clone(),
            display_text: self.display_text.clone(),
            label_id: self.label_id,
        }
    }

    /// Set by the server; changes only through re-hydration
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

/// Default pre-create/pre-update hook: enforce the backend's length limits
pub fn validate_mapping(mapping: MerchantMapping) -> Result<MerchantMapping, DomainError> {
    mapping
        .validate()
        .map_err(|e| DomainError::hook_rejected(format!("Invalid merchant mapping: {}", e)))?;

    Ok(mapping)
}

/// Placeholder replacement within one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelMapping {
    pub placeholder: String,
    pub display_text: String,
    pub label_id: i64,
}

/// All label mappings of one field, in server order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLabelMapping {
    pub field: String,
    pub mappings: Vec<LabelMapping>,
}

impl FieldLabelMapping {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            mappings: Vec::new(),
        }
    }
}

/// Acknowledgement of a bulk save: `{"message", "count"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkAck {
    pub message: String,
    pub count: u64,
}

/// Acknowledgement of a bulk delete by field: `{"deleted": <fields removed>}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkDeleteAck {
    pub deleted: u64,
}
