//! Snapshot providers backed by a page file.
//!
//! A browser bridge rewrites one file whenever the displayed page changes.
//! Supports: JSON (`url`, `subject`, `body`) and plain text (optional
//! `Subject:` first line, body below).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::actors::traits::SnapshotSource;
use crate::actors::WatcherHandle;
use crate::config::DEFAULT_MIN_BODY_CHARS;
use crate::detector::MessageSnapshot;
use crate::error::AppError;

/// Raw content of the page file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

/// A `null` text field reads as empty, same as a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PageSnapshot {
    /// Parse page file content based on file extension
    pub fn parse(path: &Path, content: &str) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(serde_json::from_str(content)?),
            _ => Ok(Self::parse_text(path, content)),
        }
    }

    fn parse_text(path: &Path, content: &str) -> Self {
        let (subject, body) = match content.split_once('\n') {
            Some((first, rest)) if is_subject_line(first) => (subject_value(first), rest),
            None if is_subject_line(content) => (subject_value(content), ""),
            _ => (String::new(), content),
        };

        Self {
            url: Some(path.display().to_string()),
            subject,
            body: body.to_string(),
        }
    }

    /// Message view of the page. Short bodies count as "no message".
    pub fn to_message(&self, min_body_chars: usize) -> MessageSnapshot {
        let body = if self.body.trim().chars().count() > min_body_chars {
            self.body.clone()
        } else {
            String::new()
        };
        MessageSnapshot::new(self.subject.clone(), body)
    }
}

fn is_subject_line(line: &str) -> bool {
    line.get(..8)
        .map(|prefix| prefix.eq_ignore_ascii_case("subject:"))
        .unwrap_or(false)
}

fn subject_value(line: &str) -> String {
    line[8..].trim().to_string()
}

/// Reads the displayed message from a page file
#[derive(Debug, Clone)]
pub struct PageFileSource {
    path: PathBuf,
    min_body_chars: usize,
}

impl PageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_min_body_chars(path, DEFAULT_MIN_BODY_CHARS)
    }

    pub fn with_min_body_chars(path: impl Into<PathBuf>, min_body_chars: usize) -> Self {
        Self {
            path: path.into(),
            min_body_chars,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current page, or `None` when the file does not exist
    pub async fn read_page(&self) -> Result<Option<PageSnapshot>, AppError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        PageSnapshot::parse(&self.path, &content).map(Some)
    }
}

#[async_trait]
impl SnapshotSource for PageFileSource {
    async fn current_snapshot(&self) -> Result<MessageSnapshot, AppError> {
        Ok(self
            .read_page()
            .await?
            .map(|page| page.to_message(self.min_body_chars))
            .unwrap_or_else(MessageSnapshot::empty))
    }
}

/// What changed between two polls of the page file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageChange {
    Navigation(Option<String>),
    Content,
}

/// Compare two observations. A different url is a navigation, anything else a content change.
pub fn diff_pages(previous: Option<&PageSnapshot>, current: Option<&PageSnapshot>) -> Option<PageChange> {
    let previous_url = previous.and_then(|p| p.url.as_ref());
    let current_url = current.and_then(|p| p.url.as_ref());

    if previous_url != current_url {
        return Some(PageChange::Navigation(current_url.cloned()));
    }
    if previous != current {
        return Some(PageChange::Content);
    }
    None
}

/// Polls the page file and feeds change notifications to the watcher
pub struct PagePoller {
    source: Arc<PageFileSource>,
    handle: WatcherHandle,
    interval: Duration,
    last: Option<PageSnapshot>,
    primed: bool,
}

impl PagePoller {
    pub fn new(source: Arc<PageFileSource>, handle: WatcherHandle, interval: Duration) -> Self {
        Self {
            source,
            handle,
            interval,
            last: None,
            primed: false,
        }
    }

    /// Poll until the watcher goes away.
    pub async fn run(mut self) -> Result<(), AppError> {
        info!(path = ?self.source.path(), "Watching page file");
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            self.poll_once().await?;
        }
    }

    /// One poll. Read errors are logged and count as "no change".
    pub async fn poll_once(&mut self) -> Result<Option<PageChange>, AppError> {
        let current = match self.source.read_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("Could not read page file: {}", e);
                return Ok(None);
            }
        };

        if !self.primed {
            self.primed = true;
            self.last = current;
            return Ok(None);
        }

        let change = diff_pages(self.last.as_ref(), current.as_ref());
        self.last = current;

        match &change {
            Some(PageChange::Navigation(url)) => {
                debug!(?url, "Page navigation");
                self.handle.navigation_changed(url.clone()).await?;
            }
            Some(PageChange::Content) => {
                self.handle.content_changed().await?;
            }
            None => {}
        }
        Ok(change)
    }
}
