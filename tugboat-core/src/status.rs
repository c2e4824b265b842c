//! Status normalization and rendering.
//!
//! The single place where heterogeneous backend shapes (duration objects vs
//! raw seconds, fraction vs length pairs, path lists) are reduced to plain
//! strings and numbers. Everything downstream of this module renders from
//! [`DownloadStatus`] alone, so identical snapshots always produce identical
//! text.

use std::time::Duration;

use crate::daemon::{DownloadStatus, FileList};

/// ETA values above this bound display as the unknown marker.
pub const ETA_SENTINEL: i64 = 999_999_999;

/// Literal token shown for unknown or out-of-range ETAs.
pub const ETA_UNKNOWN: &str = "N/A";

/// Segment count of the fixed-width progress bar.
const PROGRESS_BAR_WIDTH: usize = 10;

/// Download states from which no further progress updates occur.
const TERMINAL_STATES: [&str; 3] = ["seeding", "completed", "complete"];

/// Placeholder prefix some daemons attach while torrent metadata resolves.
const METADATA_MARKER: &str = "[METADATA]";

/// ETA as delivered by a backend, before normalization.
///
/// qBittorrent reports raw integer seconds; the aria2 adapter derives a time
/// span from length and speed. Both reduce to integer seconds here before any
/// formatting happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EtaValue {
    Seconds(i64),
    Span(Duration),
}

/// Reduces an ETA value to integer seconds.
pub fn eta_seconds(eta: EtaValue) -> i64 {
    match eta {
        EtaValue::Seconds(seconds) => seconds,
        EtaValue::Span(span) => span.as_secs().min(i64::MAX as u64) as i64,
    }
}

/// Completion percentage from completed/total lengths.
///
/// A zero or missing total reports 0.0 rather than dividing by zero.
pub fn percent_from_lengths(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// Completion percentage from a 0.0-1.0 fraction.
pub fn percent_from_fraction(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Formats a percentage with two decimals and a trailing percent sign.
pub fn format_percent(percent: f64) -> String {
    format!("{percent:.2}%")
}

/// Formats normalized ETA seconds as `H:MM:SS`, or `N/A` when out of range.
pub fn format_eta(seconds: i64) -> String {
    if seconds < 0 || seconds > ETA_SENTINEL {
        return ETA_UNKNOWN.to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Formats a byte-per-second rate as `KB/s` with two decimals.
pub fn format_speed(bytes_per_sec: u64) -> String {
    format!("{:.2} KB/s", bytes_per_sec as f64 / 1024.0)
}

/// Fixed-width progress bar; filled segments = floor(percent / 10).
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 10.0).floor() as usize).min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}]",
        "=".repeat(filled),
        " ".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// Strips the metadata-pending placeholder marker from a display name.
pub fn strip_metadata_marker(name: &str) -> &str {
    name.strip_prefix(METADATA_MARKER).unwrap_or(name).trim()
}

/// Case-insensitive membership in the terminal state set.
pub fn is_terminal(state: &str) -> bool {
    let lowered = state.to_lowercase();
    TERMINAL_STATES.contains(&lowered.as_str())
}

/// Renders the full status text block for a chat message.
///
/// Deterministic: the same snapshot always renders the same text, which is
/// what lets the tracker suppress redundant message edits by comparison.
pub fn render_status(status: &DownloadStatus) -> String {
    let mut text = format!(
        "Name: {}\nProgress: {} {}\nState: {}\nETA: {}\nSpeed: {}",
        status.name,
        progress_bar(status.percent),
        format_percent(status.percent),
        status.state,
        format_eta(status.eta_seconds),
        format_speed(status.speed_bps),
    );

    if let FileList::Resolved(files) = &status.files {
        if !files.is_empty() {
            text.push_str("\nFiles:");
            for file in files {
                text.push_str("\n  ");
                text.push_str(file);
            }
        }
    }

    text.push_str(&format!("\nId: {}", status.id));
    text
}

/// Completion marker appended once a terminal state is observed.
pub fn completion_marker(state: &str) -> String {
    format!("\nStatus: Download is now {state}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::DownloadId;

    fn sample_status() -> DownloadStatus {
        DownloadStatus {
            id: DownloadId::new("gid123"),
            name: "Foo".to_string(),
            percent: 50.0,
            state: "active".to_string(),
            eta_seconds: 125,
            speed_bps: 0,
            files: FileList::Resolved(vec!["a.mkv".to_string()]),
        }
    }

    #[test]
    fn test_eta_seconds_reduces_span_first() {
        assert_eq!(eta_seconds(EtaValue::Span(Duration::from_secs(125))), 125);
        assert_eq!(eta_seconds(EtaValue::Seconds(125)), 125);
    }

    #[test]
    fn test_format_eta_in_range() {
        assert_eq!(format_eta(125), "0:02:05");
        assert_eq!(format_eta(0), "0:00:00");
        assert_eq!(format_eta(3661), "1:01:01");
        assert_eq!(format_eta(90_000), "25:00:00");
    }

    #[test]
    fn test_format_eta_out_of_range_is_na() {
        assert_eq!(format_eta(-1), "N/A");
        assert_eq!(format_eta(ETA_SENTINEL + 1), "N/A");
        // The sentinel itself is still in range
        assert_ne!(format_eta(ETA_SENTINEL), "N/A");
    }

    #[test]
    fn test_percent_from_lengths_guards_zero_total() {
        assert_eq!(percent_from_lengths(100, 0), 0.0);
        assert_eq!(format_percent(percent_from_lengths(100, 0)), "0.00%");
        assert_eq!(format_percent(percent_from_lengths(50, 100)), "50.00%");
        assert_eq!(format_percent(percent_from_lengths(1, 3)), "33.33%");
    }

    #[test]
    fn test_percent_from_fraction() {
        assert_eq!(format_percent(percent_from_fraction(0.5)), "50.00%");
        assert_eq!(format_percent(percent_from_fraction(1.0)), "100.00%");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0), "0.00 KB/s");
        assert_eq!(format_speed(1024), "1.00 KB/s");
        assert_eq!(format_speed(1536), "1.50 KB/s");
    }

    #[test]
    fn test_progress_bar_fill() {
        assert_eq!(progress_bar(0.0), "[          ]");
        assert_eq!(progress_bar(50.0), "[=====     ]");
        assert_eq!(progress_bar(59.9), "[=====     ]");
        assert_eq!(progress_bar(100.0), "[==========]");
    }

    #[test]
    fn test_strip_metadata_marker() {
        assert_eq!(strip_metadata_marker("[METADATA]Some.Torrent"), "Some.Torrent");
        assert_eq!(strip_metadata_marker("Some.Torrent"), "Some.Torrent");
    }

    #[test]
    fn test_is_terminal_case_insensitive() {
        assert!(is_terminal("seeding"));
        assert!(is_terminal("Completed"));
        assert!(is_terminal("COMPLETE"));
        assert!(!is_terminal("active"));
        assert!(!is_terminal("metaDL"));
    }

    #[test]
    fn test_render_status_contains_expected_fields() {
        let text = render_status(&sample_status());
        assert!(text.contains("50.00%"));
        assert!(text.contains("0:02:05"));
        assert!(text.contains("a.mkv"));
        assert!(text.contains("gid123"));
    }

    #[test]
    fn test_render_status_is_idempotent() {
        let status = sample_status();
        assert_eq!(render_status(&status), render_status(&status));
    }

    #[test]
    fn test_render_status_omits_unresolved_files() {
        let mut status = sample_status();
        status.files = FileList::NotReady;
        let not_ready = render_status(&status);
        status.files = FileList::Resolved(Vec::new());
        let empty = render_status(&status);
        assert!(!not_ready.contains("Files:"));
        assert_eq!(not_ready, empty);
    }
}
