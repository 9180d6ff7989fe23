//! The periodic task abstraction.

use async_trait::async_trait;
use serde_json::Value;

use docsync_core::error::AppError;

/// A unit of work the scheduler runs on a cron schedule.
#[async_trait]
pub trait PeriodicTask: Send + Sync + std::fmt::Debug {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Run once and return a summary of what was done.
    async fn run(&self) -> Result<Value, TaskError>;
}

/// Error from a task run
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The task ran but could not finish its work
    #[error("Task failed: {0}")]
    Failed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}
