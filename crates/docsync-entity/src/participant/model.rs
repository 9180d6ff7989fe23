//! Participant entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Payment state of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing received yet.
    Unpaid,
    /// Proof uploaded, awaiting confirmation.
    Pending,
    /// Payment confirmed.
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown payment status '{other}'")),
        }
    }
}

/// A workshop registrant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    /// Row identifier.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// WhatsApp number (unique).
    pub whatsapp: String,
    /// Email address.
    pub email: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Name of the participant's workshop.
    pub workshop_name: Option<String>,
    /// Address of the participant's workshop.
    pub workshop_address: Option<String>,
    /// Employment status.
    pub employment_status: Option<String>,
    /// Why the participant registered.
    pub reason: Option<String>,
    /// Cohort membership.
    pub cohort_id: Option<i64>,
    /// Whether the participant may attend the workshop.
    pub workshop_access: bool,
    /// Whether the participant may read the protected documents,
    /// independently of any grant.
    pub document_access: bool,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Group chat link copied from the cohort at registration.
    pub contact_link: Option<String>,
    /// When the participant registered.
    pub registered_at: DateTime<Utc>,
    /// When document access was last switched on.
    pub document_access_granted_at: Option<DateTime<Utc>>,
    /// Credential hash, if the participant has a login.
    #[serde(skip_serializing)]
    pub credential_hash: Option<String>,
    /// Reference to an uploaded payment proof.
    pub payment_proof: Option<String>,
}

/// Registration form data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewParticipant {
    /// Full name.
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// WhatsApp number: digits with an optional leading `+`.
    #[validate(length(min = 8, max = 20, message = "WhatsApp number must be 8 to 20 characters"))]
    pub whatsapp: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Home address.
    pub address: Option<String>,
    /// Workshop name.
    #[validate(length(max = 200))]
    pub workshop_name: Option<String>,
    /// Workshop address.
    pub workshop_address: Option<String>,
    /// Employment status.
    pub employment_status: Option<String>,
    /// Registration reason.
    pub reason: Option<String>,
    /// Name of the cohort to join.
    pub cohort: Option<String>,
}

impl NewParticipant {
    /// Whether the WhatsApp number is digits with an optional leading `+`.
    pub fn has_valid_whatsapp(&self) -> bool {
        let digits = self.whatsapp.strip_prefix('+').unwrap_or(&self.whatsapp);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }
}
