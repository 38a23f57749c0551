//! # Detector Module
//!
//! Fast, phrase-based rejection detection for the alarm.
//! Decides, for each observed message snapshot, whether a new alert is due.
//!
//! ## Components
//! - `phrases`: Fixed rejection and job-context phrase sets
//! - `classifier`: Two-gate substring classifier (pure)
//! - `snapshot`: Message snapshot value and its fingerprint
//! - `tracker`: Deduplicating session tracker (owns the counter)

pub mod classifier;
pub mod phrases;
pub mod snapshot;
pub mod tracker;

pub use classifier::{Classification, RejectionClassifier};
pub use phrases::{PhraseSet, CONTEXT_PHRASES, REJECTION_PHRASES};
pub use snapshot::MessageSnapshot;
pub use tracker::{SessionTracker, TrackerEvent, TrackerState};
