//! Periodic background tasks for DocSync.
//!
//! This crate provides:
//! - The [`PeriodicTask`] trait implemented by every scheduled task
//! - A cron-driven [`SyncScheduler`] that runs registered tasks one at a time
//! - The catalog synchronization and grant revocation tasks

pub mod jobs;
pub mod scheduler;
pub mod task;

pub use scheduler::{SyncScheduler, TickOutcome};
pub use task::{PeriodicTask, TaskError};
