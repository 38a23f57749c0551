use crate::detector::MessageSnapshot;
use crate::error::AppError;
use async_trait::async_trait;

/// Source of the currently displayed message.
///
/// Implementations must return [`MessageSnapshot::empty`] when no message is shown.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    /// Reads the visible subject and body right now.
    async fn current_snapshot(&self) -> Result<MessageSnapshot, AppError>;
}

/// Audible/visual alert played once per fired event.
///
/// Fire-and-forget: the watcher logs a failure and moves on.
pub trait AlertEffect: Send + Sync + 'static {
    fn play(&self) -> Result<(), AppError>;
}

/// User notification shown once per fired event with the updated count.
pub trait NotifyEffect: Send + Sync + 'static {
    fn notify(&self, count: u64) -> Result<(), AppError>;
}

/// Key-value persistence for the rejection counter across restarts.
#[async_trait]
pub trait CountStore: Send + Sync + 'static {
    /// Returns 0 when nothing was stored yet.
    async fn load_count(&self) -> Result<u64, AppError>;

    async fn persist_count(&self, count: u64) -> Result<(), AppError>;
}
