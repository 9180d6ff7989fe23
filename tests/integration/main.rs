//! Workspace integration tests.

mod helpers;

mod entitlement_test;
mod scheduler_test;
mod sync_test;
