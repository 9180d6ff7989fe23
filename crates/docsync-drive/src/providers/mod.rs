//! Remote storage client implementations.

pub mod google;
pub mod memory;

pub use google::GoogleDriveClient;
pub use memory::InMemoryDrive;
