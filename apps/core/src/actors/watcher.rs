use crate::actors::messages::WatcherMessage;
use crate::actors::traits::{AlertEffect, CountStore, NotifyEffect, SnapshotSource};
use crate::config::WatcherTimings;
use crate::detector::{SessionTracker, TrackerEvent, TrackerState};
use crate::error::AppError;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, timeout, Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Upper bound for a request/response round trip with the actor.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A handle to the watcher actor.
///
/// The actor owns the only [`SessionTracker`], so every evaluation is serialized
/// through its channel. Handles are cheap to clone.
#[derive(Clone)]
pub struct WatcherHandle {
    sender: mpsc::Sender<WatcherMessage>,
}

impl WatcherHandle {
    /// Spawns the watcher on the current tokio runtime and returns a handle to it.
    ///
    /// The counter is loaded from `store` when the actor starts; a failing store
    /// starts the counter at 0.
    pub fn spawn<S, A, N, C>(
        source: Arc<S>,
        alert: Arc<A>,
        notifier: Arc<N>,
        store: Arc<C>,
        timings: WatcherTimings,
    ) -> Self
    where
        S: SnapshotSource,
        A: AlertEffect,
        N: NotifyEffect,
        C: CountStore,
    {
        let (sender, receiver) = mpsc::channel(32);
        let runner = WatcherRunner {
            receiver,
            source,
            alert,
            notifier,
            store,
            timings,
            tracker: SessionTracker::new(),
            pending_check: None,
        };
        tokio::spawn(async move { runner.run().await });
        Self { sender }
    }

    /// Reports that the displayed content changed. The check is debounced.
    pub async fn content_changed(&self) -> Result<(), AppError> {
        self.send(WatcherMessage::ContentChanged).await
    }

    /// Reports a navigation. The dedupe baseline is cleared before the next check.
    #[instrument(skip(self))]
    pub async fn navigation_changed(&self, url: Option<String>) -> Result<(), AppError> {
        self.send(WatcherMessage::NavigationChanged { url }).await
    }

    /// Evaluates the current snapshot now and returns the fired event, if any.
    #[instrument(skip(self))]
    pub async fn check_now(&self) -> Result<Option<TrackerEvent>, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(WatcherMessage::CheckNow { responder: send }).await?;
        Ok(timeout(REQUEST_TIMEOUT, recv).await??)
    }

    /// Zeroes the counter; the dedupe baseline is kept.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<u64, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(WatcherMessage::Reset { responder: send }).await?;
        Ok(timeout(REQUEST_TIMEOUT, recv).await??)
    }

    /// Plays the alert effect without touching the counter.
    pub async fn test_alert(&self) -> Result<(), AppError> {
        self.send(WatcherMessage::TestAlert).await
    }

    pub async fn state(&self) -> Result<TrackerState, AppError> {
        let (send, recv) = oneshot::channel();
        self.send(WatcherMessage::GetState { responder: send }).await?;
        Ok(timeout(REQUEST_TIMEOUT, recv).await??)
    }

    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.send(WatcherMessage::Shutdown).await
    }

    async fn send(&self, msg: WatcherMessage) -> Result<(), AppError> {
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

// --- Actor Runner ---
struct WatcherRunner<S, A, N, C>
where
    S: SnapshotSource,
    A: AlertEffect,
    N: NotifyEffect,
    C: CountStore,
{
    receiver: mpsc::Receiver<WatcherMessage>,
    source: Arc<S>,
    alert: Arc<A>,
    notifier: Arc<N>,
    store: Arc<C>,
    timings: WatcherTimings,
    tracker: SessionTracker,
    /// Deadline of the next scheduled check
    pending_check: Option<Instant>,
}

impl<S, A, N, C> WatcherRunner<S, A, N, C>
where
    S: SnapshotSource,
    A: AlertEffect,
    N: NotifyEffect,
    C: CountStore,
{
    async fn run(mut self) {
        let count = match self.store.load_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not load rejection count, starting at 0: {}", e);
                0
            }
        };
        self.tracker = SessionTracker::with_count(count);
        info!(count, "Watcher started");

        if let Some(delay) = self.timings.initial_check {
            self.schedule_check(delay);
        }

        loop {
            let deadline = self.pending_check;
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(WatcherMessage::Shutdown) | None => break,
                    Some(msg) => self.handle_message(msg).await,
                },
                _ = wait_until(deadline) => {
                    self.pending_check = None;
                    self.check_current_message().await;
                }
            }
        }
        info!("Watcher stopped");
    }

    async fn handle_message(&mut self, msg: WatcherMessage) {
        match msg {
            WatcherMessage::ContentChanged => {
                self.schedule_check(self.timings.debounce);
            }
            WatcherMessage::NavigationChanged { url } => {
                debug!(?url, "Navigation detected, clearing baseline");
                self.tracker.clear_baseline();
                self.schedule_check(self.timings.navigation_settle);
            }
            WatcherMessage::CheckNow { responder } => {
                self.pending_check = None;
                let event = self.check_current_message().await;
                let _ = responder.send(event);
            }
            WatcherMessage::Reset { responder } => {
                self.tracker.reset();
                if let Err(e) = self.store.persist_count(0).await {
                    warn!("Could not persist counter reset: {}", e);
                }
                info!("Rejection counter reset");
                let _ = responder.send(self.tracker.count());
            }
            WatcherMessage::TestAlert => {
                if let Err(e) = self.alert.play() {
                    error!("Test alert failed: {}", e);
                }
            }
            WatcherMessage::GetState { responder } => {
                let _ = responder.send(self.tracker.state().clone());
            }
            // Handled by the run loop
            WatcherMessage::Shutdown => {}
        }
    }

    /// Schedules a check `delay` from now. A pending check is never moved earlier.
    fn schedule_check(&mut self, delay: Duration) {
        let at = Instant::now() + delay;
        self.pending_check = Some(match self.pending_check {
            Some(existing) if existing > at => existing,
            _ => at,
        });
    }

    async fn check_current_message(&mut self) -> Option<TrackerEvent> {
        let snapshot = match self.source.current_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Could not read current message: {}", e);
                return None;
            }
        };

        let event = self.tracker.evaluate(&snapshot)?;
        self.fire(event).await;
        Some(event)
    }

    /// Runs the effects for a fired event. Failures never roll back the tracker.
    async fn fire(&self, event: TrackerEvent) {
        if let Err(e) = self.alert.play() {
            error!("Alert effect failed: {}", e);
        }
        if let Err(e) = self.notifier.notify(event.count) {
            error!("Notify effect failed: {}", e);
        }
        if let Err(e) = self.store.persist_count(event.count).await {
            warn!("Could not persist rejection count {}: {}", event.count, e);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
