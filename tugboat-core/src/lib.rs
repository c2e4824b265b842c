//! Tugboat Core - Daemon delegation and progress tracking
//!
//! This crate provides the fundamental building blocks for the Tugboat chat
//! bot: torrent daemon client adapters, status normalization, the progress
//! tracking state machine, and configuration management.

pub mod config;
pub mod daemon;
pub mod status;
pub mod tracker;
pub mod tracing_setup;
pub mod uptime;

// Re-export main types for convenient access
pub use config::TugboatConfig;
pub use daemon::{DaemonClient, DaemonError, DaemonHealth, DownloadId, DownloadStatus, FileList};
pub use tracker::{ProgressSink, ProgressTracker, SessionRegistry, TrackerOutcome};

/// Core errors that can bubble up from any Tugboat subsystem.
///
/// High-level error types representing failures in core functionality.
#[derive(Debug, thiserror::Error)]
pub enum TugboatError {
    #[error("Daemon error: {0}")]
    Daemon(#[from] daemon::DaemonError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TugboatError {
    /// Returns a user-friendly error message suitable for a chat reply.
    pub fn user_message(&self) -> String {
        match self {
            TugboatError::Daemon(e) => match e {
                DaemonError::Connectivity { detail } => {
                    format!("Download daemon unreachable: {detail}")
                }
                DaemonError::Auth { detail } => {
                    format!("Download daemon rejected credentials: {detail}")
                }
                DaemonError::NotFound { id } => format!("Download {id} not found"),
                DaemonError::Submission { detail } => format!("Could not add download: {detail}"),
                _ => "Download daemon error occurred".to_string(),
            },
            TugboatError::Configuration { reason } => format!("Configuration error: {reason}"),
            TugboatError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TugboatError>;
