//! Test Module
//!
//! Test suite for the rejection alarm.
//!
//! ## Test Categories
//! - `detector_tests`: Classifier gates and tracker state transitions
//! - `watcher_tests`: Debounce, dedupe, navigation and failure isolation of the watcher actor
//! - `database_tests`: Counter persistence
//! - `source_tests`: Page file extraction and polling
//! - `config_tests`: Environment configuration

pub mod source_tests;
