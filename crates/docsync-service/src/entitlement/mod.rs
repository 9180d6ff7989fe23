//! Document access entitlements.

pub mod service;

pub use service::EntitlementService;
