//! Expired grant revocation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use docsync_service::EntitlementService;

use crate::task::{PeriodicTask, TaskError};

/// Deactivates grants whose expiry has passed.
#[derive(Debug)]
pub struct GrantRevocationJob {
    /// Entitlement service
    entitlements: Arc<EntitlementService>,
}

impl GrantRevocationJob {
    /// Create a new revocation job
    pub fn new(entitlements: Arc<EntitlementService>) -> Self {
        Self { entitlements }
    }
}

#[async_trait]
impl PeriodicTask for GrantRevocationJob {
    fn name(&self) -> &str {
        "grant_revocation"
    }

    async fn run(&self) -> Result<Value, TaskError> {
        let revoked = self.entitlements.revoke_expired().await?;
        tracing::debug!(revoked, "Grant revocation pass finished");
        Ok(serde_json::json!({
            "task": "grant_revocation",
            "revoked": revoked,
        }))
    }
}
