//! Cohort management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_entity::participant::{Cohort, NewCohort};

use super::Services;

/// Arguments for cohort commands
#[derive(Debug, Args)]
pub struct CohortArgs {
    /// Cohort subcommand
    #[command(subcommand)]
    pub command: CohortCommand,
}

/// Cohort subcommands
#[derive(Debug, Subcommand)]
pub enum CohortCommand {
    /// Create a cohort
    Create {
        /// Cohort name
        name: String,
        /// Group chat link handed to members
        #[arg(long, default_value = "")]
        contact_link: String,
        /// Members get workshop access on registration
        #[arg(long)]
        default_access: bool,
    },
    /// List cohorts
    List,
}

/// Cohort display row
#[derive(Debug, Serialize, Tabled)]
struct CohortRow {
    /// Cohort ID
    id: i64,
    /// Name
    name: String,
    /// Contact link
    contact_link: String,
    /// Default access
    default_access: bool,
    /// Open for registration
    active: bool,
}

impl From<&Cohort> for CohortRow {
    fn from(c: &Cohort) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            contact_link: c.contact_link.clone(),
            default_access: c.default_access,
            active: c.is_active,
        }
    }
}

/// Execute cohort commands
pub async fn execute(
    args: &CohortArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;

    match &args.command {
        CohortCommand::Create {
            name,
            contact_link,
            default_access,
        } => {
            let cohort = services
                .participants
                .create_cohort(NewCohort {
                    name: name.clone(),
                    contact_link: contact_link.clone(),
                    default_access: *default_access,
                })
                .await?;
            output::print_success(&format!("Cohort '{}' created with ID {}", cohort.name, cohort.id));
        }
        CohortCommand::List => {
            let cohorts = services.participants.list_cohorts().await?;
            let rows: Vec<CohortRow> = cohorts.iter().map(CohortRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
