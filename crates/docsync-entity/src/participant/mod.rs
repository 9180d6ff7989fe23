//! Participant and cohort entities.

pub mod cohort;
pub mod model;

pub use cohort::{Cohort, NewCohort};
pub use model::{NewParticipant, Participant, PaymentStatus};
