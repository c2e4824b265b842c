//! Persisted process start timestamp.
//!
//! A single-field JSON file read at startup and written if absent, used only
//! for the uptime line of the health command. Because an existing file is
//! reused, the displayed uptime spans process restarts. I/O problems degrade
//! to "started just now" rather than failing startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedState {
    started_at: i64,
}

/// Loads the persisted start timestamp, writing the current time if the file
/// does not exist or cannot be parsed.
pub fn load_or_init(path: &Path) -> i64 {
    let now = chrono::Utc::now().timestamp();

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<PersistedState>(&contents) {
            Ok(state) => return state.started_at,
            Err(e) => {
                tracing::warn!("state file {} unreadable, rewriting: {e}", path.display());
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!("state file {} unreadable: {e}", path.display());
            return now;
        }
    }

    let state = PersistedState { started_at: now };
    if let Ok(serialized) = serde_json::to_string_pretty(&state) {
        if let Err(e) = std::fs::write(path, serialized) {
            tracing::warn!("could not persist start time to {}: {e}", path.display());
        }
    }
    now
}

/// Formats elapsed time since `started_at` as `Xh Ym`.
pub fn format_uptime(started_at: i64, now: i64) -> String {
    let elapsed = (now - started_at).max(0);
    let hours = elapsed / 3600;
    let minutes = (elapsed % 3600) / 60;
    format!("{hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_or_init_writes_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let first = load_or_init(&path);
        assert!(path.exists());

        // A second load reads the persisted value back
        let second = load_or_init(&path);
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_or_init_rewrites_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let started = load_or_init(&path);
        assert!(started > 0);

        let reread = load_or_init(&path);
        assert_eq!(started, reread);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0, 3 * 3600 + 42 * 60), "3h 42m");
        assert_eq!(format_uptime(0, 59), "0h 0m");
        // Clock skew never renders negative uptime
        assert_eq!(format_uptime(100, 0), "0h 0m");
    }
}
