//! Document access grant entities.

pub mod model;

pub use model::{AccessGrant, GrantKind, GrantTarget, NewAccessGrant};
