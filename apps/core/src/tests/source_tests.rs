//! Page File Source Tests
//!
//! Snapshot extraction from page files and the poller feeding the watcher.

use super::watcher_tests::{test_timings, MockAlert, MockNotifier};
use crate::actors::traits::SnapshotSource;
use crate::actors::WatcherHandle;
use crate::database::MemoryCountStore;
use crate::detector::MessageSnapshot;
use crate::source::{PageChange, PageFileSource, PagePoller};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::time::Duration;

const REJECTION_BODY: &str = "Thank you for your application. Unfortunately, we have decided to move forward with other candidates for this position.";

fn write_page(path: &Path, url: &str, subject: &str, body: &str) {
    let json = serde_json::json!({ "url": url, "subject": subject, "body": body });
    std::fs::write(path, json.to_string()).expect("Failed to write page file");
}

fn spawn_watcher(source: Arc<PageFileSource>) -> (WatcherHandle, Arc<MockAlert>) {
    let alert = Arc::new(MockAlert::default());
    let handle = WatcherHandle::spawn(
        source,
        alert.clone(),
        Arc::new(MockNotifier::default()),
        Arc::new(MemoryCountStore::new()),
        test_timings(),
    );
    (handle, alert)
}

#[cfg(test)]
mod page_file_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_no_message() {
        let dir = tempdir().unwrap();
        let source = PageFileSource::new(dir.path().join("nothing.json"));

        let snapshot = source.current_snapshot().await.unwrap();
        assert_eq!(snapshot, MessageSnapshot::empty());
    }

    #[tokio::test]
    async fn test_json_page_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        write_page(&path, "https://mail/1", "Your application", REJECTION_BODY);

        let snapshot = PageFileSource::new(&path).current_snapshot().await.unwrap();
        assert_eq!(snapshot.subject, "Your application");
        assert_eq!(snapshot.body, REJECTION_BODY);
    }

    #[tokio::test]
    async fn test_text_page_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.txt");
        std::fs::write(&path, format!("Subject: Update\n{}", REJECTION_BODY)).unwrap();

        let snapshot = PageFileSource::new(&path).current_snapshot().await.unwrap();
        assert_eq!(snapshot.subject, "Update");
        assert_eq!(snapshot.body, REJECTION_BODY);
    }

    #[tokio::test]
    async fn test_min_body_threshold_is_configurable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        write_page(&path, "u", "s", "short body");

        let strict = PageFileSource::new(&path).current_snapshot().await.unwrap();
        assert!(!strict.has_body());

        let lenient = PageFileSource::with_min_body_chars(&path, 0)
            .current_snapshot()
            .await
            .unwrap();
        assert_eq!(lenient.body, "short body");
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(PageFileSource::new(&path).current_snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_null_subject_still_classifies_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        let json = serde_json::json!({ "url": "https://mail/1", "subject": null, "body": REJECTION_BODY });
        std::fs::write(&path, json.to_string()).unwrap();

        let source = Arc::new(PageFileSource::new(&path));
        let snapshot = source.current_snapshot().await.expect("null subject must not fail");
        assert_eq!(snapshot.subject, "");
        assert_eq!(snapshot.body, REJECTION_BODY);

        let (handle, alert) = spawn_watcher(source);
        let event = handle.check_now().await.unwrap();
        assert_eq!(event.map(|e| e.count), Some(1));
        assert_eq!(alert.plays(), 1);
    }

    #[tokio::test]
    async fn test_null_body_is_no_message() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(
            &path,
            r#"{"url": null, "subject": "Your application", "body": null}"#,
        )
        .unwrap();

        let snapshot = PageFileSource::new(&path).current_snapshot().await.unwrap();
        assert!(!snapshot.has_body());
    }
}

#[cfg(test)]
mod poller_tests {
    use super::*;

    #[tokio::test]
    async fn test_poller_reports_content_and_navigation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        write_page(&path, "https://mail/1", "Hello", "first body");

        let source = Arc::new(PageFileSource::new(&path));
        let (handle, _alert) = spawn_watcher(source.clone());
        let mut poller = PagePoller::new(source, handle, Duration::from_millis(500));

        // First poll only primes the poller
        assert_eq!(poller.poll_once().await.unwrap(), None);
        assert_eq!(poller.poll_once().await.unwrap(), None);

        write_page(&path, "https://mail/1", "Hello", "second body");
        assert_eq!(poller.poll_once().await.unwrap(), Some(PageChange::Content));

        write_page(&path, "https://mail/2", "Hello", "second body");
        assert_eq!(
            poller.poll_once().await.unwrap(),
            Some(PageChange::Navigation(Some("https://mail/2".into())))
        );

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            poller.poll_once().await.unwrap(),
            Some(PageChange::Navigation(None))
        );
    }

    #[tokio::test]
    async fn test_poller_read_error_is_no_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        write_page(&path, "https://mail/1", "Hello", "body");

        let source = Arc::new(PageFileSource::new(&path));
        let (handle, _alert) = spawn_watcher(source.clone());
        let mut poller = PagePoller::new(source, handle, Duration::from_millis(500));
        poller.poll_once().await.unwrap();

        std::fs::write(&path, "{broken").unwrap();
        assert_eq!(poller.poll_once().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_navigation_through_page_file_refires() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.json");
        write_page(&path, "https://mail/inbox/1", "Your application", REJECTION_BODY);

        let source = Arc::new(PageFileSource::new(&path));
        let (handle, alert) = spawn_watcher(source.clone());

        let first = handle.check_now().await.unwrap();
        assert_eq!(first.map(|e| e.count), Some(1));

        let mut poller = PagePoller::new(source, handle.clone(), Duration::from_millis(500));
        poller.poll_once().await.unwrap();
        write_page(&path, "https://mail/inbox", "", "");
        poller.poll_once().await.unwrap();
        write_page(&path, "https://mail/inbox/1", "Your application", REJECTION_BODY);
        poller.poll_once().await.unwrap();

        let second = handle.check_now().await.unwrap();
        assert_eq!(second.map(|e| e.count), Some(2));
        assert_eq!(alert.plays(), 2);
    }
}
