//! Synchronization audit log entities.

pub mod model;

pub use model::{NewSyncLog, SyncCounts, SyncLog, SyncStatus};
