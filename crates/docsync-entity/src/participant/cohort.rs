//! Cohort entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named group of participants sharing defaults and a contact channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cohort {
    /// Row identifier.
    pub id: i64,
    /// Unique cohort name.
    pub name: String,
    /// Group chat link handed to members.
    pub contact_link: String,
    /// Workshop access granted to new members by default.
    pub default_access: bool,
    /// Whether the cohort still accepts registrations.
    pub is_active: bool,
    /// When the cohort was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCohort {
    /// Unique cohort name.
    pub name: String,
    /// Group chat link.
    pub contact_link: String,
    /// Default workshop access for members.
    pub default_access: bool,
}
