//! Tree synchronization from the remote store into the catalog.

pub mod service;

pub use service::SyncService;
