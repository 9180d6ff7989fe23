//! Core traits defined in `docsync-core` and implemented by other crates.

pub mod clock;
pub mod remote;

pub use clock::{Clock, ManualClock, SystemClock};
pub use remote::{RemoteFolderMeta, RemoteItem, RemoteItemKind, RemoteStorageClient};
