//! Built-in periodic tasks.

pub mod revocation;
pub mod sync;

pub use revocation::GrantRevocationJob;
pub use sync::CatalogSyncJob;
