//! Access grant commands.

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use docsync_core::config::AppConfig;
use docsync_core::error::AppError;
use docsync_entity::grant::{AccessGrant, NewAccessGrant};

use super::Services;

/// Arguments for grant commands
#[derive(Debug, Args)]
pub struct GrantArgs {
    /// Grant subcommand
    #[command(subcommand)]
    pub command: GrantCommand,
}

/// Grant subcommands
#[derive(Debug, Subcommand)]
pub enum GrantCommand {
    /// Issue a grant to one participant or one cohort
    Issue {
        /// Target participant ID
        #[arg(long, conflicts_with = "cohort")]
        participant: Option<i64>,
        /// Target cohort ID
        #[arg(long)]
        cohort: Option<i64>,
        /// Start time (RFC 3339, default: now)
        #[arg(long, value_parser = parse_time)]
        starts: Option<DateTime<Utc>>,
        /// Expiry time (RFC 3339)
        #[arg(long, value_parser = parse_time, conflicts_with = "days")]
        expires: Option<DateTime<Utc>>,
        /// Expire this many days from now
        #[arg(long)]
        days: Option<i64>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
        /// Issuer name
        #[arg(long)]
        by: Option<String>,
    },
    /// List grants of a participant or a cohort
    List {
        /// Participant ID
        #[arg(long, conflicts_with = "cohort")]
        participant: Option<i64>,
        /// Cohort ID
        #[arg(long)]
        cohort: Option<i64>,
    },
    /// Deactivate a grant
    Revoke {
        /// Grant ID
        id: i64,
    },
}

/// Grant display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// Grant ID
    id: i64,
    /// Individual or cohort
    kind: String,
    /// Target ID
    target: i64,
    /// Active flag
    active: bool,
    /// Start
    starts_at: String,
    /// Expiry
    expires_at: String,
    /// Note
    note: String,
}

impl From<&AccessGrant> for GrantRow {
    fn from(g: &AccessGrant) -> Self {
        Self {
            id: g.id,
            kind: g.kind.to_string(),
            target: g.participant_id.or(g.cohort_id).unwrap_or_default(),
            active: g.is_active,
            starts_at: g.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            expires_at: output::opt(g.expires_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
            note: output::opt(g.note.as_deref()),
        }
    }
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

/// Execute grant commands
pub async fn execute(
    args: &GrantArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let entitlements = &services.entitlements;

    match &args.command {
        GrantCommand::Issue {
            participant,
            cohort,
            starts,
            expires,
            days,
            note,
            by,
        } => {
            let expires_at = match (expires, days) {
                (Some(t), _) => Some(*t),
                (None, Some(d)) => Some(starts.unwrap_or_else(Utc::now) + Duration::days(*d)),
                (None, None) => None,
            };
            let grant = entitlements
                .issue_grant(NewAccessGrant {
                    participant_id: *participant,
                    cohort_id: *cohort,
                    starts_at: *starts,
                    expires_at,
                    note: note.clone(),
                    created_by: by.clone(),
                })
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&grant),
                OutputFormat::Table => {
                    output::print_success(&format!("Grant {} issued", grant.id));
                    output::print_list(&[GrantRow::from(&grant)], format);
                }
            }
        }
        GrantCommand::List {
            participant,
            cohort,
        } => {
            let grants = match (participant, cohort) {
                (Some(id), _) => entitlements.grants_for_participant(*id).await?,
                (None, Some(id)) => entitlements.grants_for_cohort(*id).await?,
                (None, None) => {
                    return Err(AppError::validation(
                        "Pass --participant or --cohort to list grants",
                    ));
                }
            };
            let rows: Vec<GrantRow> = grants.iter().map(GrantRow::from).collect();
            output::print_list(&rows, format);
        }
        GrantCommand::Revoke { id } => {
            let grant = entitlements.revoke_grant(*id).await?;
            output::print_success(&format!("Grant {} revoked", grant.id));
        }
    }

    Ok(())
}

/// Run one expiry sweep
pub async fn sweep(config: &AppConfig) -> Result<(), AppError> {
    let services = Services::open(config).await?;
    let revoked = services.entitlements.revoke_expired().await?;
    output::print_success(&format!("{} expired grant(s) deactivated", revoked));
    Ok(())
}
