//! Job Rejection Alarm core.
//!
//! Classifies the currently displayed email as a job-application rejection and
//! fires an alert exactly once per distinct message view.

pub mod actors;
pub mod config;
pub mod database;
pub mod detector;
pub mod effects;
pub mod error;
pub mod fs_manager;
pub mod logging;
pub mod sound;
pub mod source;

#[cfg(test)]
mod tests;

pub use actors::WatcherHandle;
pub use detector::{MessageSnapshot, RejectionClassifier, SessionTracker, TrackerEvent, TrackerState};
pub use error::AppError;
