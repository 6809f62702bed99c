//! Merchant entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::domain::entity::{Entity, Relation};

/// A merchant managed through the back office.
///
/// The free-text fields (`valid_time`, `traffic_conditions`, ...) may contain
/// placeholders that the backend substitutes using the field label mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: u64,
    pub title: String,
    pub legal_representative: String,
    pub business_address: String,
    pub business_district: String,
    pub valid_time: String,
    pub traffic_conditions: String,
    pub fixed_events: String,
    pub terminal_type: String,
    pub special_time_periods: String,
    pub custom_filters: String,

    /// Owner, always a hydrated user (default when the server omits it)
    pub owner: User,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl Entity for Merchant {
    const NAME: &'static str = "merchant";
    const RELATIONS: &'static [Relation] = &[Relation::of::<User>("owner")];

    fn id(&self) -> u64 {
        self.id
    }
}

impl Merchant {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
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
