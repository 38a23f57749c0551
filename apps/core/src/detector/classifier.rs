//! Rejection classification using two phrase gates.
//!
//! A message is a rejection when it contains at least one rejection phrase
//! AND at least one job-context phrase. Matching is plain substring search on
//! lowercased text, no word boundaries.

use serde::{Deserialize, Serialize};

use super::phrases::PhraseSet;

/// Result of classifying a piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Both gates passed
    pub is_rejection: bool,
    /// First rejection phrase found, if any
    pub rejection_phrase: Option<String>,
    /// First context phrase found; only searched once a rejection phrase matched
    pub context_phrase: Option<String>,
}

impl Classification {
    fn negative() -> Self {
        Self {
            is_rejection: false,
            rejection_phrase: None,
            context_phrase: None,
        }
    }
}

/// Pure rejection classifier
#[derive(Debug, Clone)]
pub struct RejectionClassifier {
    rejection: PhraseSet,
    context: PhraseSet,
}

impl Default for RejectionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RejectionClassifier {
    /// Create a classifier with the built-in phrase sets
    pub fn new() -> Self {
        Self::with_phrases(PhraseSet::rejection(), PhraseSet::context())
    }

    /// Create a classifier with custom phrase sets
    pub fn with_phrases(rejection: PhraseSet, context: PhraseSet) -> Self {
        Self { rejection, context }
    }

    pub fn rejection_phrases(&self) -> &PhraseSet {
        &self.rejection
    }

    pub fn context_phrases(&self) -> &PhraseSet {
        &self.context
    }

    /// Absent or empty text is never a rejection
    pub fn is_rejection(&self, text: Option<&str>) -> bool {
        match text {
            Some(text) => self.classify(text).is_rejection,
            None => false,
        }
    }

    /// Classify `text`, reporting which phrases opened each gate
    pub fn classify(&self, text: &str) -> Classification {
        if text.is_empty() {
            return Classification::negative();
        }

        let normalized = text.to_lowercase();

        let Some(rejection_phrase) = self.rejection.first_match(&normalized) else {
            return Classification::negative();
        };

        let context_phrase = self.context.first_match(&normalized);

        Classification {
            is_rejection: context_phrase.is_some(),
            rejection_phrase: Some(rejection_phrase.to_string()),
            context_phrase: context_phrase.map(str::to_string),
        }
    }
}
