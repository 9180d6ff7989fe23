//! Participant registration and cohorts.

pub mod service;

pub use service::ParticipantService;
