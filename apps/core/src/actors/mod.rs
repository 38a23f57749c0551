//! Watcher actor and the collaborator seams it drives.

pub mod messages;
pub mod traits;
pub mod watcher;

pub use messages::WatcherMessage;
pub use traits::{AlertEffect, CountStore, NotifyEffect, SnapshotSource};
pub use watcher::WatcherHandle;
