//! Participant management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_entity::participant::{NewParticipant, Participant, PaymentStatus};

use super::Services;

/// Arguments for participant commands
#[derive(Debug, Args)]
pub struct ParticipantArgs {
    /// Participant subcommand
    #[command(subcommand)]
    pub command: ParticipantCommand,
}

/// Participant subcommands
#[derive(Debug, Subcommand)]
pub enum ParticipantCommand {
    /// Register a participant
    Register {
        /// Full name
        #[arg(long)]
        name: String,
        /// WhatsApp number
        #[arg(long)]
        whatsapp: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Workshop name
        #[arg(long)]
        workshop: Option<String>,
        /// Cohort name
        #[arg(long)]
        cohort: Option<String>,
    },
    /// List participants
    List {
        /// Only members of this cohort ID
        #[arg(long)]
        cohort: Option<i64>,
    },
    /// Switch a participant's own document-access flag
    DocAccess {
        /// Participant ID
        id: i64,
        /// Revoke instead of grant
        #[arg(long)]
        off: bool,
    },
    /// Record a payment status
    Payment {
        /// Participant ID
        id: i64,
        /// unpaid, pending or paid
        status: PaymentStatus,
    },
}

/// Participant display row
#[derive(Debug, Serialize, Tabled)]
struct ParticipantRow {
    /// Participant ID
    id: i64,
    /// Name
    name: String,
    /// WhatsApp
    whatsapp: String,
    /// Cohort ID
    cohort: String,
    /// Workshop access
    workshop: bool,
    /// Document access flag
    documents: bool,
    /// Payment
    payment: String,
    /// Registered
    registered_at: String,
}

impl From<&Participant> for ParticipantRow {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            whatsapp: p.whatsapp.clone(),
            cohort: output::opt(p.cohort_id),
            workshop: p.workshop_access,
            documents: p.document_access,
            payment: p.payment_status.to_string(),
            registered_at: p.registered_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute participant commands
pub async fn execute(
    args: &ParticipantArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let participants = &services.participants;

    match &args.command {
        ParticipantCommand::Register {
            name,
            whatsapp,
            email,
            workshop,
            cohort,
        } => {
            let p = participants
                .register(NewParticipant {
                    name: name.clone(),
                    whatsapp: whatsapp.clone(),
                    email: email.clone(),
                    workshop_name: workshop.clone(),
                    cohort: cohort.clone(),
                    ..NewParticipant::default()
                })
                .await?;
            output::print_success(&format!("Participant {} registered", p.id));
            output::print_item(&p, format);
        }
        ParticipantCommand::List { cohort } => {
            let list = participants.list(*cohort).await?;
            let rows: Vec<ParticipantRow> = list.iter().map(ParticipantRow::from).collect();
            output::print_list(&rows, format);
        }
        ParticipantCommand::DocAccess { id, off } => {
            let p = participants.set_document_access(*id, !off).await?;
            let state = if p.document_access { "enabled" } else { "disabled" };
            output::print_success(&format!("Document access {} for '{}'", state, p.name));
        }
        ParticipantCommand::Payment { id, status } => {
            let p = participants.set_payment_status(*id, *status).await?;
            output::print_success(&format!("Payment status of '{}' is now {}", p.name, status));
        }
    }

    Ok(())
}
