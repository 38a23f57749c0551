use serde::{Deserialize, Serialize};

/// Visible text of the currently displayed message at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl MessageSnapshot {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Snapshot returned when no message is displayed
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Dedupe key: subject and body joined by a single space
    pub fn fingerprint(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_keeps_separator() {
        assert_eq!(MessageSnapshot::new("A", "B").fingerprint(), "A B");
        assert_eq!(MessageSnapshot::new("", "B").fingerprint(), " B");
    }

    #[test]
    fn test_empty_snapshot_has_no_body() {
        assert!(!MessageSnapshot::empty().has_body());
        assert!(MessageSnapshot::new("", "x").has_body());
    }
}
