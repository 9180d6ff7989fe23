//! Read-side catalog queries.

pub mod service;
mod tree;

pub use service::CatalogService;
