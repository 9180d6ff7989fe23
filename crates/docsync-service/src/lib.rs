//! # docsync-service
//!
//! Business logic service layer for DocSync. Each service orchestrates
//! repositories, the remote storage client and the clock to implement
//! application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod catalog;
pub mod entitlement;
pub mod participant;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::CatalogService;
pub use entitlement::EntitlementService;
pub use participant::ParticipantService;
pub use sync::SyncService;
