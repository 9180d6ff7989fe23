//! # docsync-entity
//!
//! Domain entity models for DocSync. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.

pub mod catalog;
pub mod file;
pub mod folder;
pub mod grant;
pub mod participant;
pub mod sync_log;
