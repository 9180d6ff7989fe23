//! # docsync-core
//!
//! Core crate for DocSync. Contains the configuration schema, the unified
//! error system, and the seams the rest of the workspace is written against:
//! the [`RemoteStorageClient`](traits::RemoteStorageClient) that describes
//! the cloud folder tree and the [`Clock`](traits::Clock) used by every
//! time-dependent rule.
//!
//! This crate has **no** internal dependencies on other DocSync crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
