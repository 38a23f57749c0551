//! Phrase sets used by the rejection classifier.
//!
//! Both sets are lowercase substrings matched against lowercased text.
//! Order matters only for reporting: the first match wins.

/// Substrings strongly correlated with application-rejection language
pub const REJECTION_PHRASES: &[&str] = &[
    "we regret to inform",
    "we have decided to move forward with other candidates",
    "we will not be moving forward",
    "not moving forward with your application",
    "we won't be moving forward",
    "we have decided not to",
    "after careful consideration",
    "after careful review",
    "we are unable to offer",
    "unfortunately",
    "we have chosen to",
    "we have selected another candidate",
    "we won't be proceeding",
    "not selected for",
    "decided to pursue other candidates",
    "we appreciate your interest but",
    "you were not selected",
    "position has been filled",
    "we will be moving in a different direction",
    "not the right fit",
    "does not meet our requirements",
    "your application was not successful",
    "unsuccessful in your application",
    "we've decided to go in a different direction",
    "no longer being considered",
];

/// Substrings indicating the message is employment-related
pub const CONTEXT_PHRASES: &[&str] = &[
    "application",
    "position",
    "role",
    "job",
    "opportunity",
    "interview",
    "candidacy",
    "candidate",
    "resume",
    "cv",
    "hiring",
];

/// An ordered, immutable set of lowercase substring patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    /// Build a phrase set, folding every pattern to ASCII lowercase
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { phrases }
    }

    /// The built-in rejection phrases
    pub fn rejection() -> Self {
        Self::new(REJECTION_PHRASES)
    }

    /// The built-in job-context phrases
    pub fn context() -> Self {
        Self::new(CONTEXT_PHRASES)
    }

    /// First phrase occurring in `normalized`, which must already be lowercase
    pub fn first_match(&self, normalized: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| normalized.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
