//! Centralized configuration for Tugboat.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;
use std::time::Duration;

use crate::daemon::DaemonKind;

/// Central configuration for all Tugboat components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct TugboatConfig {
    pub daemon: DaemonConfig,
    pub tracker: TrackerConfig,
    pub telegram: TelegramConfig,
    pub search: SearchConfig,
}

/// Download daemon connection configuration.
///
/// Exactly one backend is active per process; the kind is fixed at startup
/// and never auto-detected.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Which daemon backend to talk to
    pub kind: DaemonKind,
    /// qBittorrent Web API base URL
    pub qbittorrent_host: String,
    /// qBittorrent Web API username
    pub qbittorrent_username: String,
    /// qBittorrent Web API password
    pub qbittorrent_password: String,
    /// aria2 RPC host
    pub aria2_host: String,
    /// aria2 RPC port
    pub aria2_port: u16,
    /// aria2 RPC shared secret (empty means no secret configured)
    pub aria2_secret: String,
    /// HTTP request timeout for daemon calls
    pub request_timeout: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            kind: DaemonKind::QBittorrent,
            qbittorrent_host: "http://localhost:8080".to_string(),
            qbittorrent_username: "admin".to_string(),
            qbittorrent_password: String::new(),
            aria2_host: "http://localhost".to_string(),
            aria2_port: 6800,
            aria2_secret: String::new(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Progress tracker polling budgets.
///
/// The tracker state machine consumes these as named constants; no retry
/// count or sleep interval appears inline anywhere else.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Attempts to confirm a freshly submitted download appears in listings
    pub submit_retry_limit: u32,
    /// Fixed delay between submit confirmation attempts
    pub submit_retry_delay: Duration,
    /// Attempts to wait out the metadata-not-ready condition
    pub metadata_retry_limit: u32,
    /// Fixed delay between metadata polls
    pub metadata_poll_interval: Duration,
    /// Fixed delay between status polls once the download is active
    pub active_poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            submit_retry_limit: 10,
            submit_retry_delay: Duration::from_secs(2),
            metadata_retry_limit: 15,
            metadata_poll_interval: Duration::from_secs(5),
            active_poll_interval: Duration::from_secs(3),
        }
    }
}

impl TrackerConfig {
    /// Creates a configuration with zero delays for deterministic tests.
    pub fn for_testing() -> Self {
        Self {
            submit_retry_limit: 3,
            submit_retry_delay: Duration::ZERO,
            metadata_retry_limit: 3,
            metadata_poll_interval: Duration::ZERO,
            active_poll_interval: Duration::ZERO,
        }
    }
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token; the only configuration whose absence is fatal at startup
    pub bot_token: Option<String>,
    /// Bot API base URL (overridable for tests)
    pub api_base: String,
    /// Long-poll timeout for getUpdates
    pub poll_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: "https://api.telegram.org".to_string(),
            poll_timeout: Duration::from_secs(30),
        }
    }
}

/// Movie metadata search configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// TMDB API key; absence degrades movie search to a fixed notice
    pub tmdb_api_key: Option<String>,
    /// TMDB API base URL (overridable for tests)
    pub api_base: String,
    /// Result language
    pub language: String,
    /// Upper bound on inline keyboard rows per search reply
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            api_base: "https://api.themoviedb.org/3".to_string(),
            language: "en".to_string(),
            result_limit: 25,
        }
    }
}

impl TugboatConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults. Secrets are only ever sourced from the
    /// environment; nothing here is fatal, the bootstrap decides what is.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(kind) = std::env::var("TUGBOAT_DAEMON") {
            if let Ok(parsed) = kind.parse() {
                config.daemon.kind = parsed;
            }
        }

        if let Ok(host) = std::env::var("QBITTORRENT_HOST") {
            config.daemon.qbittorrent_host = host;
        }
        if let Ok(username) = std::env::var("QBITTORRENT_USERNAME") {
            config.daemon.qbittorrent_username = username;
        }
        if let Ok(password) = std::env::var("QBITTORRENT_PASSWORD") {
            config.daemon.qbittorrent_password = password;
        }

        if let Ok(host) = std::env::var("ARIA2_HOST") {
            config.daemon.aria2_host = host;
        }
        if let Ok(port) = std::env::var("ARIA2_PORT") {
            if let Ok(parsed) = port.parse() {
                config.daemon.aria2_port = parsed;
            }
        }
        if let Ok(secret) = std::env::var("ARIA2_SECRET") {
            config.daemon.aria2_secret = secret;
        }

        if let Ok(seconds) = std::env::var("TUGBOAT_POLL_INTERVAL") {
            if let Ok(parsed) = seconds.parse::<u64>() {
                config.tracker.active_poll_interval = Duration::from_secs(parsed);
            }
        }

        config.telegram.bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        if let Ok(base) = std::env::var("TELEGRAM_API_BASE") {
            config.telegram.api_base = base;
        }

        config.search.tmdb_api_key = std::env::var("TMDB_API_KEY").ok();
        if let Ok(base) = std::env::var("TMDB_API_BASE") {
            config.search.api_base = base;
        }

        config
    }

    /// Path of the JSON file holding the persisted process start timestamp.
    pub fn state_file() -> PathBuf {
        std::env::var("TUGBOAT_STATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tugboat-state.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = TugboatConfig::default();

        assert_eq!(config.daemon.kind, DaemonKind::QBittorrent);
        assert_eq!(config.daemon.aria2_port, 6800);
        assert_eq!(config.tracker.submit_retry_limit, 10);
        assert_eq!(config.tracker.submit_retry_delay, Duration::from_secs(2));
        assert_eq!(config.tracker.metadata_retry_limit, 15);
        assert_eq!(
            config.tracker.metadata_poll_interval,
            Duration::from_secs(5)
        );
        assert_eq!(config.tracker.active_poll_interval, Duration::from_secs(3));
        assert!(config.telegram.bot_token.is_none());
        assert!(config.search.tmdb_api_key.is_none());
    }

    #[test]
    fn test_testing_preset_has_zero_delays() {
        let tracker = TrackerConfig::for_testing();
        assert_eq!(tracker.submit_retry_delay, Duration::ZERO);
        assert_eq!(tracker.metadata_poll_interval, Duration::ZERO);
        assert_eq!(tracker.active_poll_interval, Duration::ZERO);
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("TUGBOAT_DAEMON", "aria2");
            std::env::set_var("ARIA2_PORT", "6801");
            std::env::set_var("TUGBOAT_POLL_INTERVAL", "7");
        }

        let config = TugboatConfig::from_env();

        assert_eq!(config.daemon.kind, DaemonKind::Aria2);
        assert_eq!(config.daemon.aria2_port, 6801);
        assert_eq!(config.tracker.active_poll_interval, Duration::from_secs(7));

        // Cleanup
        unsafe {
            std::env::remove_var("TUGBOAT_DAEMON");
            std::env::remove_var("ARIA2_PORT");
            std::env::remove_var("TUGBOAT_POLL_INTERVAL");
        }
    }
}
