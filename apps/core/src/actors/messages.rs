use crate::detector::{TrackerEvent, TrackerState};
use tokio::sync::oneshot;

/// Messages that can be sent to the watcher actor.
///
/// `ContentChanged` and `NavigationChanged` are the change-notification feed;
/// the rest are requests from the surrounding application.
#[derive(Debug)]
pub enum WatcherMessage {
    /// The displayed content mutated. Debounced before a check runs.
    ContentChanged,
    /// The host navigated to a different page or message.
    NavigationChanged {
        /// New location, for logging only.
        url: Option<String>,
    },
    /// Evaluate the current snapshot immediately, bypassing the debounce.
    CheckNow {
        responder: oneshot::Sender<Option<TrackerEvent>>,
    },
    /// Zero the counter and persist it.
    Reset {
        /// Receives the counter value after the reset.
        responder: oneshot::Sender<u64>,
    },
    /// Play the alert without counting anything.
    TestAlert,
    /// Read a copy of the tracker state.
    GetState {
        responder: oneshot::Sender<TrackerState>,
    },
    /// Stop the actor.
    Shutdown,
}
