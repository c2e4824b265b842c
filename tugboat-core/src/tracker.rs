//! Progress tracking state machine.
//!
//! One tracker per submitted download: confirm the daemon actually lists the
//! identifier, wait out the metadata-not-ready window, then poll and edit a
//! single chat message until a terminal state or an adapter error. All retry
//! counts and sleep intervals come from [`TrackerConfig`], and every tracking
//! session owns its own last-rendered text.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::TrackerConfig;
use crate::daemon::{DaemonClient, DownloadId, DownloadStatus, FileList};
use crate::status::{completion_marker, is_terminal, render_status};

/// Receives rendered status text.
///
/// The chat-side implementation edits one previously sent message; tests use
/// an in-memory recorder. The tracker only calls this when the text actually
/// changed, plus exactly once for a completion or error notice.
#[async_trait]
pub trait ProgressSink: Send {
    /// Replaces the displayed text with `text`.
    ///
    /// # Errors
    /// - `SinkError` - The underlying message edit failed
    async fn update(&mut self, text: &str) -> Result<(), SinkError>;
}

/// Failure to deliver a rendered update.
#[derive(Debug, thiserror::Error)]
#[error("progress sink update failed: {detail}")]
pub struct SinkError {
    pub detail: String,
}

/// Final state of a tracking session. Absorbing; the session is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// Terminal download state observed and completion marker rendered
    Completed,
    /// Adapter error rendered exactly once
    Failed,
    /// Submission never appeared in daemon listings within budget
    DetailsUnavailable,
}

/// Polling loop bound to one download identifier and one chat message.
pub struct ProgressTracker {
    daemon: Arc<dyn DaemonClient>,
    config: TrackerConfig,
    id: DownloadId,
    /// Per-session edit suppression state
    last_rendered: Option<String>,
}

impl ProgressTracker {
    pub fn new(daemon: Arc<dyn DaemonClient>, config: TrackerConfig, id: DownloadId) -> Self {
        Self {
            daemon,
            config,
            id,
            last_rendered: None,
        }
    }

    /// Runs the session to an absorbing state.
    ///
    /// States: submitted -> awaiting metadata -> active -> terminal, with any
    /// state able to fail. The retry budgets only cover the submitted and
    /// awaiting-metadata phases; an adapter error while actively polling is
    /// rendered once and ends the session.
    pub async fn run(mut self, sink: &mut dyn ProgressSink) -> TrackerOutcome {
        let confirmed = match self.confirm_submission().await {
            Some(status) => status,
            None => {
                tracing::warn!(id = %self.id, "download never appeared in daemon listings");
                self.push(
                    sink,
                    "Download added, but details are unavailable after repeated attempts.",
                )
                .await;
                return TrackerOutcome::DetailsUnavailable;
            }
        };

        let status = match self.await_metadata(confirmed).await {
            Ok(status) => status,
            Err(detail) => {
                self.push(sink, &detail).await;
                return TrackerOutcome::Failed;
            }
        };

        self.poll_active(status, sink).await
    }

    /// Submitted state: wait for the identifier to show up in the daemon.
    ///
    /// The daemon needs a beat to register a fresh submission, so the first
    /// attempt sleeps too. Exhausting the budget does not remove the download
    /// from the daemon; only the tracking session gives up.
    async fn confirm_submission(&self) -> Option<DownloadStatus> {
        for attempt in 1..=self.config.submit_retry_limit {
            tokio::time::sleep(self.config.submit_retry_delay).await;
            match self.daemon.fetch_one(&self.id).await {
                Ok(status) => return Some(status),
                Err(e) => {
                    tracing::debug!(id = %self.id, attempt, "submission not confirmed yet: {e}");
                }
            }
        }
        None
    }

    /// Awaiting-metadata state: bounded wait for the file list tri-state to
    /// leave NotReady, degrading to an empty resolved list on exhaustion.
    async fn await_metadata(&self, mut status: DownloadStatus) -> Result<DownloadStatus, String> {
        let mut attempts = 0;
        while status.files.is_not_ready() {
            if attempts >= self.config.metadata_retry_limit {
                tracing::debug!(id = %self.id, "metadata wait exhausted, proceeding without file list");
                status.files = FileList::Resolved(Vec::new());
                break;
            }
            tokio::time::sleep(self.config.metadata_poll_interval).await;
            status = self
                .daemon
                .fetch_one(&self.id)
                .await
                .map_err(|e| format!("Error tracking download: {e}"))?;
            attempts += 1;
        }
        Ok(status)
    }

    /// Active state: poll, render, edit on change, stop on terminal state.
    async fn poll_active(
        &mut self,
        mut status: DownloadStatus,
        sink: &mut dyn ProgressSink,
    ) -> TrackerOutcome {
        loop {
            let text = render_status(&status);

            if is_terminal(&status.state) {
                let final_text = format!("{text}{}", completion_marker(&status.state));
                self.push(sink, &final_text).await;
                tracing::info!(id = %self.id, state = %status.state, "download reached terminal state");
                return TrackerOutcome::Completed;
            }

            self.edit_if_changed(sink, text).await;
            tokio::time::sleep(self.config.active_poll_interval).await;

            status = match self.daemon.fetch_one(&self.id).await {
                Ok(status) => status,
                Err(e) => {
                    self.push(sink, &format!("Error tracking download: {e}")).await;
                    return TrackerOutcome::Failed;
                }
            };
        }
    }

    /// Edits the message only when the rendered text differs from the last
    /// delivered render. A failed edit keeps the old text so the next poll
    /// retries the delivery.
    async fn edit_if_changed(&mut self, sink: &mut dyn ProgressSink, text: String) {
        if self.last_rendered.as_deref() == Some(text.as_str()) {
            return;
        }
        match sink.update(&text).await {
            Ok(()) => self.last_rendered = Some(text),
            Err(e) => tracing::warn!(id = %self.id, "status edit failed: {e}"),
        }
    }

    /// One-shot delivery for completion and failure notices.
    async fn push(&mut self, sink: &mut dyn ProgressSink, text: &str) {
        if let Err(e) = sink.update(text).await {
            tracing::warn!(id = %self.id, "final status edit failed: {e}");
        }
        self.last_rendered = Some(text.to_string());
    }
}

/// Live tracking sessions, keyed by download identifier.
///
/// Introspection only (the health command reports how many sessions are
/// live); rendering state stays inside each session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<DownloadId, String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: DownloadId, name: impl Into<String>) {
        self.sessions.write().insert(id, name.into());
    }

    pub fn unregister(&self, id: &DownloadId) {
        self.sessions.write().remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of (identifier, display name) pairs.
    pub fn active(&self) -> Vec<(DownloadId, String)> {
        self.sessions
            .read()
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::mock::MockDaemon;
    use crate::daemon::DaemonError;

    struct RecordingSink {
        edits: Vec<String>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { edits: Vec::new() }
        }
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn update(&mut self, text: &str) -> Result<(), SinkError> {
            self.edits.push(text.to_string());
            Ok(())
        }
    }

    fn tracker_for(daemon: Arc<MockDaemon>) -> ProgressTracker {
        ProgressTracker::new(daemon, TrackerConfig::for_testing(), DownloadId::new("gid123"))
    }

    #[tokio::test]
    async fn test_tracks_to_completion_and_suppresses_identical_renders() {
        let daemon = Arc::new(MockDaemon::new());
        let active = MockDaemon::status(
            "gid123",
            "active",
            50.0,
            FileList::Resolved(vec!["a.mkv".to_string()]),
        );
        daemon.push_fetch(Ok(active.clone()));
        daemon.push_fetch(Ok(active));
        daemon.push_fetch(Ok(MockDaemon::status(
            "gid123",
            "completed",
            100.0,
            FileList::Resolved(vec!["a.mkv".to_string()]),
        )));

        let mut sink = RecordingSink::new();
        let outcome = tracker_for(daemon.clone()).run(&mut sink).await;

        assert_eq!(outcome, TrackerOutcome::Completed);
        // Two identical active renders produce a single edit
        assert_eq!(sink.edits.len(), 2);
        assert!(sink.edits[0].contains("50.00%"));
        assert!(sink.edits[0].contains("0:02:05"));
        assert!(sink.edits[0].contains("a.mkv"));
        assert!(sink.edits[1].contains("Download is now completed."));
        assert_eq!(daemon.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_adapter_error_fails_with_one_message() {
        let daemon = Arc::new(MockDaemon::new());
        daemon.push_fetch(Ok(MockDaemon::status(
            "gid123",
            "active",
            10.0,
            FileList::Resolved(vec![]),
        )));
        daemon.push_fetch(Err(DaemonError::Rpc {
            detail: "not found".to_string(),
        }));

        let mut sink = RecordingSink::new();
        let outcome = tracker_for(daemon.clone()).run(&mut sink).await;

        assert_eq!(outcome, TrackerOutcome::Failed);
        assert_eq!(sink.edits.len(), 2);
        assert!(sink.edits[1].contains("Error tracking download"));
        assert_eq!(daemon.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_metadata_exhaustion_degrades_to_empty_file_list() {
        let daemon = Arc::new(MockDaemon::new());
        // Enough NotReady snapshots to exhaust the testing budget of 3
        for _ in 0..4 {
            daemon.push_fetch(Ok(MockDaemon::status(
                "gid123",
                "active",
                0.0,
                FileList::NotReady,
            )));
        }
        daemon.push_fetch(Ok(MockDaemon::status(
            "gid123",
            "completed",
            100.0,
            FileList::NotReady,
        )));

        let mut sink = RecordingSink::new();
        let outcome = tracker_for(daemon.clone()).run(&mut sink).await;

        assert_eq!(outcome, TrackerOutcome::Completed);
        // First active render went out without any file section
        assert!(!sink.edits[0].contains("Files:"));
    }

    #[tokio::test]
    async fn test_unconfirmed_submission_reports_details_unavailable() {
        let daemon = Arc::new(MockDaemon::new());

        let mut sink = RecordingSink::new();
        let outcome = tracker_for(daemon.clone()).run(&mut sink).await;

        assert_eq!(outcome, TrackerOutcome::DetailsUnavailable);
        assert_eq!(sink.edits.len(), 1);
        assert!(sink.edits[0].contains("details are unavailable"));
        // Budget from the testing preset
        assert_eq!(daemon.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_immediately_terminal_download_renders_marker_once() {
        let daemon = Arc::new(MockDaemon::new());
        daemon.push_fetch(Ok(MockDaemon::status(
            "gid123",
            "Seeding",
            100.0,
            FileList::Resolved(vec!["a.mkv".to_string()]),
        )));

        let mut sink = RecordingSink::new();
        let outcome = tracker_for(daemon.clone()).run(&mut sink).await;

        assert_eq!(outcome, TrackerOutcome::Completed);
        assert_eq!(sink.edits.len(), 1);
        assert!(sink.edits[0].contains("Download is now Seeding."));
    }

    #[test]
    fn test_session_registry_tracks_live_sessions() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        registry.register(DownloadId::new("a"), "First");
        registry.register(DownloadId::new("b"), "Second");
        assert_eq!(registry.len(), 2);

        registry.unregister(&DownloadId::new("a"));
        let active = registry.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].1, "Second");
    }
}
