use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::Entity;

/// Account that owns merchants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub email: String,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl Entity for User {
    const NAME: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}

impl User {
    /// Name to show in listings, falling back to the username
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
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
