//! Scripted daemon client for tests.
//!
//! Plays back a fixed sequence of `fetch_one` results, repeating the final
//! entry once the script runs dry, and counts calls so tests can assert how
//! many polls a tracker actually performed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{DaemonClient, DaemonError, DaemonHealth, DaemonKind, DownloadId, DownloadStatus, FileList};

/// One scripted `fetch_one` outcome.
pub type ScriptedFetch = Result<DownloadStatus, DaemonError>;

/// Scripted daemon used by tracker and handler tests.
#[derive(Debug)]
pub struct MockDaemon {
    submit_result: Mutex<Option<Result<DownloadId, DaemonError>>>,
    script: Mutex<VecDeque<ScriptedFetch>>,
    last: Mutex<Option<DownloadStatus>>,
    pub fetch_calls: AtomicUsize,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self {
            submit_result: Mutex::new(None),
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the result the next `submit` call returns.
    pub fn with_submit(self, result: Result<DownloadId, DaemonError>) -> Self {
        *self.submit_result.lock() = Some(result);
        self
    }

    /// Appends one outcome to the `fetch_one` script.
    pub fn push_fetch(&self, outcome: ScriptedFetch) {
        self.script.lock().push_back(outcome);
    }

    /// Convenience: a plain snapshot for scripting.
    pub fn status(id: &str, state: &str, percent: f64, files: FileList) -> DownloadStatus {
        DownloadStatus {
            id: DownloadId::new(id),
            name: "Foo".to_string(),
            percent,
            state: state.to_string(),
            eta_seconds: 125,
            speed_bps: 1024,
            files,
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockDaemon {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DaemonClient for MockDaemon {
    fn kind(&self) -> DaemonKind {
        DaemonKind::QBittorrent
    }

    async fn submit(&self, _source: &str) -> Result<DownloadId, DaemonError> {
        self.submit_result
            .lock()
            .take()
            .unwrap_or_else(|| Ok(DownloadId::new("gid123")))
    }

    async fn list_all(&self) -> Result<Vec<DownloadStatus>, DaemonError> {
        let last = self.last.lock();
        Ok(last.iter().cloned().collect())
    }

    async fn fetch_one(&self, id: &DownloadId) -> Result<DownloadStatus, DaemonError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(status)) => {
                *self.last.lock() = Some(status.clone());
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            // Script exhausted: repeat the last snapshot, else report missing
            None => match self.last.lock().clone() {
                Some(status) => Ok(status),
                None => Err(DaemonError::NotFound { id: id.clone() }),
            },
        }
    }

    async fn remove(&self, _id: &DownloadId, _delete_files: bool) -> Result<(), DaemonError> {
        Ok(())
    }

    async fn probe(&self) -> DaemonHealth {
        DaemonHealth {
            reachable: true,
            authenticated: true,
            detail: Some("mock".to_string()),
        }
    }
}
