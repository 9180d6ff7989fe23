//! Repository implementations for all DocSync entities.

pub mod cohort;
pub mod file;
pub mod folder;
pub mod grant;
pub mod participant;
pub mod sync_log;

pub use cohort::CohortRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use grant::{GrantRecord, GrantRepository};
pub use participant::ParticipantRepository;
pub use sync_log::SyncLogRepository;
