//! # docsync-drive
//!
//! Remote storage client implementations for DocSync. The Google Drive
//! client talks to the Drive v3 REST API with a service account; the
//! in-memory client backs tests and offline runs.

pub mod manager;
pub mod providers;

pub use manager::connect;
pub use providers::{GoogleDriveClient, InMemoryDrive};
