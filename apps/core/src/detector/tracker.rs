//! Session tracker: deduplicates snapshots and counts rejections.
//!
//! The tracker owns a single [`TrackerState`]. It is not synchronized; confine
//! it to one task (see `actors::watcher`) or wrap it in a mutex.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::classifier::RejectionClassifier;
use super::snapshot::MessageSnapshot;

/// Mutable state of one tracking session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Fingerprint of the last evaluated snapshot, empty at start
    pub last_fingerprint: String,
    /// Rejections seen; only `reset` lowers it
    pub rejection_count: u64,
}

/// Emitted when a new fingerprint classifies as a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerEvent {
    pub fired: bool,
    /// Counter value after the increment
    pub count: u64,
}

/// Deduplicating rejection tracker
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    classifier: RejectionClassifier,
    state: TrackerState,
}

impl SessionTracker {
    /// Tracker with the built-in classifier and a zero counter
    pub fn new() -> Self {
        Self::with_count(0)
    }

    /// Tracker resuming from a persisted counter
    pub fn with_count(rejection_count: u64) -> Self {
        Self::with_classifier(RejectionClassifier::new(), rejection_count)
    }

    pub fn with_classifier(classifier: RejectionClassifier, rejection_count: u64) -> Self {
        Self {
            classifier,
            state: TrackerState {
                last_fingerprint: String::new(),
                rejection_count,
            },
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn count(&self) -> u64 {
        self.state.rejection_count
    }

    pub fn last_fingerprint(&self) -> &str {
        &self.state.last_fingerprint
    }

    /// Evaluate a snapshot. Returns an event only on a transition into a new rejection.
    pub fn evaluate(&mut self, snapshot: &MessageSnapshot) -> Option<TrackerEvent> {
        if !snapshot.has_body() {
            return None;
        }

        let fingerprint = snapshot.fingerprint();
        if fingerprint == self.state.last_fingerprint {
            return None;
        }

        // The baseline advances even when the message is not a rejection
        let classification = self.classifier.classify(&fingerprint);
        self.state.last_fingerprint = fingerprint;

        if !classification.is_rejection {
            debug!(
                rejection_phrase = ?classification.rejection_phrase,
                "New message is not a rejection"
            );
            return None;
        }

        self.state.rejection_count += 1;
        info!(
            count = self.state.rejection_count,
            rejection_phrase = ?classification.rejection_phrase,
            context_phrase = ?classification.context_phrase,
            "Job Rejection Alarm: REJECTION DETECTED"
        );

        Some(TrackerEvent {
            fired: true,
            count: self.state.rejection_count,
        })
    }

    /// Zero the counter. The fingerprint is kept so a seen rejection does not re-fire.
    pub fn reset(&mut self) {
        self.state.rejection_count = 0;
    }

    /// Forget the baseline after a navigation so revisited content can fire again
    pub fn clear_baseline(&mut self) {
        self.state.last_fingerprint.clear();
    }
}
