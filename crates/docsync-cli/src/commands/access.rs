//! Document access check command.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;

use super::Services;

/// Arguments for access commands
#[derive(Debug, Args)]
pub struct AccessArgs {
    /// Access subcommand
    #[command(subcommand)]
    pub command: AccessCommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Report whether a participant may read the documents right now
    Check {
        /// Participant ID
        participant: i64,
    },
}

#[derive(Debug, Serialize)]
struct AccessReport {
    participant_id: i64,
    name: String,
    document_access_flag: bool,
    active_grants: usize,
    has_access: bool,
}

/// Execute access commands
pub async fn execute(
    args: &AccessArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;

    match &args.command {
        AccessCommand::Check { participant } => {
            let p = services.participants.get(*participant).await?;
            let grants = services
                .entitlements
                .grants_for_participant(p.id)
                .await?;
            let report = AccessReport {
                participant_id: p.id,
                name: p.name,
                document_access_flag: p.document_access,
                active_grants: grants.iter().filter(|g| g.is_active).count(),
                has_access: services.entitlements.has_document_access(p.id).await?,
            };
            output::print_item(&report, format);
        }
    }

    Ok(())
}
