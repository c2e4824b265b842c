//! Download daemon client abstraction
//!
//! One logical surface over the two supported torrent daemons (qBittorrent's
//! Web API and aria2's JSON-RPC). Exactly one backend is active per process,
//! selected from configuration at startup; the rest of the system only ever
//! sees normalized [`DownloadStatus`] values.

pub mod aria2;
pub mod qbittorrent;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DaemonConfig;

pub use aria2::Aria2Client;
pub use qbittorrent::QBittorrentClient;

/// Opaque backend-assigned download identifier.
///
/// An info-hash for qBittorrent, a GID for aria2. The sole key used to
/// correlate a tracked download across poll iterations; every other field of
/// a status snapshot may change or disappear between polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadId(String);

impl DownloadId {
    /// Creates a download identifier from a backend-assigned string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DownloadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// File list tri-state.
///
/// `NotReady` means the daemon has not fetched torrent metadata yet, which is
/// semantically different from `Resolved` with zero entries. The tracker's
/// bounded metadata retry depends on this distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileList {
    /// Metadata still resolving; a file list does not exist yet
    NotReady,
    /// Metadata resolved; the list may legitimately be empty
    Resolved(Vec<String>),
}

impl FileList {
    /// Returns true while the daemon has not resolved torrent metadata.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, FileList::NotReady)
    }
}

/// Normalized, display-ready snapshot of one download.
///
/// Produced at the adapter edge; duration objects, path types and raw
/// fraction/length pairs never cross this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadStatus {
    pub id: DownloadId,
    /// Human-readable name with placeholder markers stripped
    pub name: String,
    /// Completion percentage, 0.0 to 100.0
    pub percent: f64,
    /// Backend-native state label, compared case-insensitively
    pub state: String,
    /// ETA reduced to integer seconds; out-of-range values display as N/A
    pub eta_seconds: i64,
    /// Download speed in bytes per second
    pub speed_bps: u64,
    pub files: FileList,
}

/// Connectivity report backing the user-facing health command.
///
/// `probe` never fails; failures are captured here as data so the health
/// command always produces a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonHealth {
    pub reachable: bool,
    pub authenticated: bool,
    /// Version string on success, explanatory text on failure
    pub detail: Option<String>,
}

/// Errors that can occur during daemon operations.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon unreachable: {detail}")]
    Connectivity { detail: String },

    #[error("authentication rejected: {detail}")]
    Auth { detail: String },

    #[error("download {id} not found")]
    NotFound { id: DownloadId },

    #[error("submission rejected: {detail}")]
    Submission { detail: String },

    #[error("daemon reported failure: {detail}")]
    Rpc { detail: String },

    #[error("invalid daemon response: {detail}")]
    InvalidResponse { detail: String },
}

/// Supported daemon backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonKind {
    QBittorrent,
    Aria2,
}

impl fmt::Display for DaemonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonKind::QBittorrent => write!(f, "qbittorrent"),
            DaemonKind::Aria2 => write!(f, "aria2"),
        }
    }
}

impl std::str::FromStr for DaemonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qbittorrent" | "qbit" => Ok(DaemonKind::QBittorrent),
            "aria2" => Ok(DaemonKind::Aria2),
            _ => Err(format!("Unknown daemon kind: {s}")),
        }
    }
}

impl Default for DaemonKind {
    fn default() -> Self {
        DaemonKind::QBittorrent
    }
}

/// Unified interface to the configured download daemon.
#[async_trait]
pub trait DaemonClient: Send + Sync + fmt::Debug {
    /// Which backend this client talks to.
    fn kind(&self) -> DaemonKind;

    /// Submits a magnet URI or direct URL and returns the assigned identifier.
    ///
    /// # Errors
    /// - `DaemonError::Submission` - Backend rejected the source
    /// - `DaemonError::Connectivity` - Backend unreachable
    /// - `DaemonError::Auth` - Credentials or token rejected
    async fn submit(&self, source: &str) -> Result<DownloadId, DaemonError>;

    /// Returns a newest-state snapshot of every download the daemon knows.
    ///
    /// # Errors
    /// - `DaemonError::Connectivity` - Backend unreachable
    /// - `DaemonError::Auth` - Credentials or token rejected
    async fn list_all(&self) -> Result<Vec<DownloadStatus>, DaemonError>;

    /// Fetches the status of a single download.
    ///
    /// # Errors
    /// - `DaemonError::NotFound` - Backend reports no such download
    /// - `DaemonError::Rpc` - Backend reports the download failed
    /// - `DaemonError::Connectivity` - Backend unreachable
    async fn fetch_one(&self, id: &DownloadId) -> Result<DownloadStatus, DaemonError>;

    /// Removes a download, optionally deleting downloaded data.
    ///
    /// # Errors
    /// - `DaemonError::NotFound` - Backend reports no such download
    /// - `DaemonError::Connectivity` - Backend unreachable
    async fn remove(&self, id: &DownloadId, delete_files: bool) -> Result<(), DaemonError>;

    /// Reports reachability and authentication state. Never fails.
    async fn probe(&self) -> DaemonHealth;
}

/// Builds the daemon client selected by configuration.
pub fn client_from_config(config: &DaemonConfig) -> Arc<dyn DaemonClient> {
    match config.kind {
        DaemonKind::QBittorrent => Arc::new(QBittorrentClient::new(config)),
        DaemonKind::Aria2 => Arc::new(Aria2Client::new(config)),
    }
}
