//! qBittorrent Web API client.
//!
//! Cookie-session authentication against `/api/v2/auth/login`, form-encoded
//! submissions, JSON status queries. The Web API marks an unknown ETA with
//! 8640000; that sentinel is pushed past the display bound so it renders as
//! `N/A` like every other unknown ETA.

use regex::Regex;
use serde::Deserialize;

use super::{DaemonClient, DaemonError, DaemonHealth, DaemonKind, DownloadId, DownloadStatus, FileList};
use crate::config::DaemonConfig;
use crate::status::{self, ETA_SENTINEL, EtaValue};

/// The Web API's "infinity" ETA marker (100 days, in seconds).
const QBIT_ETA_INFINITY: i64 = 8_640_000;

/// State label reported while torrent metadata is still downloading.
const STATE_FETCHING_METADATA: &str = "metaDL";

/// qBittorrent Web API client.
#[derive(Debug)]
pub struct QBittorrentClient {
    base: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

/// Torrent entry from `/api/v2/torrents/info`.
#[derive(Debug, Clone, Deserialize)]
struct RawTorrent {
    hash: String,
    #[serde(default)]
    name: String,
    /// Completion fraction, 0.0 to 1.0
    #[serde(default)]
    progress: f64,
    #[serde(default)]
    state: String,
    #[serde(default = "unknown_eta")]
    eta: i64,
    #[serde(default)]
    dlspeed: u64,
}

fn unknown_eta() -> i64 {
    QBIT_ETA_INFINITY
}

/// File entry from `/api/v2/torrents/files`.
#[derive(Debug, Clone, Deserialize)]
struct RawFile {
    name: String,
}

impl QBittorrentClient {
    /// Creates a client from daemon configuration.
    ///
    /// The cookie store carries the SID session cookie issued by login.
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            base: config.qbittorrent_host.trim_end_matches('/').to_string(),
            username: config.qbittorrent_username.clone(),
            password: config.qbittorrent_password.clone(),
            client: reqwest::Client::builder()
                .cookie_store(true)
                .timeout(config.request_timeout)
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }

    /// Authenticates and stores the session cookie.
    ///
    /// # Errors
    /// - `DaemonError::Connectivity` - Transport failure
    /// - `DaemonError::Auth` - Credentials rejected
    async fn login(&self) -> Result<(), DaemonError> {
        let response = self
            .client
            .post(format!("{}/api/v2/auth/login", self.base))
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let http_status = response.status();
        if http_status == reqwest::StatusCode::FORBIDDEN {
            return Err(DaemonError::Auth {
                detail: "login forbidden (IP banned after failed attempts?)".to_string(),
            });
        }
        if !http_status.is_success() {
            return Err(DaemonError::Connectivity {
                detail: format!("login failed with HTTP {http_status}"),
            });
        }

        let body = response.text().await.unwrap_or_default();
        if !body.to_ascii_lowercase().contains("ok") {
            return Err(DaemonError::Auth {
                detail: "login rejected credentials".to_string(),
            });
        }

        Ok(())
    }

    async fn fetch_torrents(&self, query: &[(&str, &str)]) -> Result<Vec<RawTorrent>, DaemonError> {
        let response = self
            .client
            .get(format!("{}/api/v2/torrents/info", self.base))
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DaemonError::Connectivity {
                detail: format!("torrent listing failed with HTTP {}", response.status()),
            });
        }

        response
            .json::<Vec<RawTorrent>>()
            .await
            .map_err(|e| DaemonError::InvalidResponse {
                detail: format!("torrent listing decode failed: {e}"),
            })
    }

    /// File list for one torrent, honoring the metadata tri-state.
    async fn fetch_files(&self, raw: &RawTorrent) -> Result<FileList, DaemonError> {
        if raw.state == STATE_FETCHING_METADATA {
            return Ok(FileList::NotReady);
        }

        let response = self
            .client
            .get(format!("{}/api/v2/torrents/files", self.base))
            .query(&[("hash", raw.hash.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DaemonError::Connectivity {
                detail: format!("file listing failed with HTTP {}", response.status()),
            });
        }

        let files = response
            .json::<Vec<RawFile>>()
            .await
            .map_err(|e| DaemonError::InvalidResponse {
                detail: format!("file listing decode failed: {e}"),
            })?;

        Ok(FileList::Resolved(files.into_iter().map(|f| f.name).collect()))
    }
}

/// Reduces a raw Web API torrent entry to the normalized status shape.
fn normalize(raw: RawTorrent, files: FileList) -> DownloadStatus {
    let eta = if raw.eta >= QBIT_ETA_INFINITY {
        ETA_SENTINEL + 1
    } else {
        status::eta_seconds(EtaValue::Seconds(raw.eta))
    };

    DownloadStatus {
        id: DownloadId::new(raw.hash),
        name: status::strip_metadata_marker(&raw.name).to_string(),
        percent: status::percent_from_fraction(raw.progress),
        state: raw.state,
        eta_seconds: eta,
        speed_bps: raw.dlspeed,
        files,
    }
}

fn transport_error(e: reqwest::Error) -> DaemonError {
    DaemonError::Connectivity {
        detail: e.to_string(),
    }
}

/// Lowercase info-hash from a magnet URI, when present.
fn extract_magnet_hash(source: &str) -> Option<String> {
    if !source.starts_with("magnet:") {
        return None;
    }
    let re = Regex::new(r"(?i)xt=urn:btih:([a-z0-9]{32,40})").ok()?;
    re.captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

#[async_trait::async_trait]
impl DaemonClient for QBittorrentClient {
    fn kind(&self) -> DaemonKind {
        DaemonKind::QBittorrent
    }

    async fn submit(&self, source: &str) -> Result<DownloadId, DaemonError> {
        self.login().await?;

        let response = self
            .client
            .post(format!("{}/api/v2/torrents/add", self.base))
            .form(&[("urls", source)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DaemonError::Submission {
                detail: format!("add failed with HTTP {}", response.status()),
            });
        }

        let body = response.text().await.unwrap_or_default();
        if body.to_ascii_lowercase().contains("fails") {
            return Err(DaemonError::Submission {
                detail: format!("daemon rejected source: {body}"),
            });
        }

        // Magnets carry their identifier; for plain URLs the hash only exists
        // once the daemon has registered the torrent, so take the newest entry.
        if let Some(hash) = extract_magnet_hash(source) {
            return Ok(DownloadId::new(hash));
        }

        let newest = self
            .fetch_torrents(&[("sort", "added_on"), ("reverse", "true"), ("limit", "1")])
            .await?;
        newest
            .into_iter()
            .next()
            .map(|raw| DownloadId::new(raw.hash))
            .ok_or_else(|| DaemonError::Submission {
                detail: "added torrent did not appear in listing".to_string(),
            })
    }

    async fn list_all(&self) -> Result<Vec<DownloadStatus>, DaemonError> {
        self.login().await?;

        let raw = self.fetch_torrents(&[]).await?;
        let mut downloads = Vec::with_capacity(raw.len());
        for torrent in raw {
            let files = self.fetch_files(&torrent).await?;
            downloads.push(normalize(torrent, files));
        }
        Ok(downloads)
    }

    async fn fetch_one(&self, id: &DownloadId) -> Result<DownloadStatus, DaemonError> {
        self.login().await?;

        let raw = self.fetch_torrents(&[("hashes", id.as_str())]).await?;
        let torrent = raw.into_iter().next().ok_or_else(|| DaemonError::NotFound {
            id: id.clone(),
        })?;

        if torrent.state == "error" || torrent.state == "missingFiles" {
            return Err(DaemonError::Rpc {
                detail: format!("daemon reports state '{}'", torrent.state),
            });
        }

        let files = self.fetch_files(&torrent).await?;
        Ok(normalize(torrent, files))
    }

    async fn remove(&self, id: &DownloadId, delete_files: bool) -> Result<(), DaemonError> {
        self.login().await?;

        let delete_flag = if delete_files { "true" } else { "false" };
        let response = self
            .client
            .post(format!("{}/api/v2/torrents/delete", self.base))
            .form(&[("hashes", id.as_str()), ("deleteFiles", delete_flag)])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(DaemonError::Connectivity {
                detail: format!("delete failed with HTTP {}", response.status()),
            });
        }
        Ok(())
    }

    async fn probe(&self) -> DaemonHealth {
        match self.login().await {
            Ok(()) => {}
            Err(DaemonError::Auth { detail }) => {
                return DaemonHealth {
                    reachable: true,
                    authenticated: false,
                    detail: Some(detail),
                };
            }
            Err(e) => {
                return DaemonHealth {
                    reachable: false,
                    authenticated: false,
                    detail: Some(e.to_string()),
                };
            }
        }

        let version = self
            .client
            .get(format!("{}/api/v2/app/version", self.base))
            .send()
            .await;

        match version {
            Ok(response) if response.status().is_success() => {
                let version = response.text().await.unwrap_or_default();
                DaemonHealth {
                    reachable: true,
                    authenticated: true,
                    detail: Some(format!("qBittorrent {version}")),
                }
            }
            Ok(response) => DaemonHealth {
                reachable: true,
                authenticated: false,
                detail: Some(format!("version query failed with HTTP {}", response.status())),
            },
            Err(e) => DaemonHealth {
                reachable: false,
                authenticated: false,
                detail: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(state: &str, eta: i64) -> RawTorrent {
        RawTorrent {
            hash: "abc123".to_string(),
            name: "Foo".to_string(),
            progress: 0.5,
            state: state.to_string(),
            eta,
            dlspeed: 2048,
        }
    }

    #[test]
    fn test_normalize_maps_fraction_to_percent() {
        let status = normalize(raw("downloading", 125), FileList::Resolved(vec![]));
        assert_eq!(status.percent, 50.0);
        assert_eq!(status.eta_seconds, 125);
        assert_eq!(status.speed_bps, 2048);
        assert_eq!(status.id.as_str(), "abc123");
    }

    #[test]
    fn test_normalize_maps_infinity_eta_past_sentinel() {
        let status = normalize(raw("downloading", QBIT_ETA_INFINITY), FileList::NotReady);
        assert!(status.eta_seconds > ETA_SENTINEL);
        assert_eq!(crate::status::format_eta(status.eta_seconds), "N/A");
    }

    #[test]
    fn test_extract_magnet_hash() {
        let source = "magnet:?xt=urn:btih:2089B05ECCA3D829CEDC70D0A1C4C76D5125E5E2&dn=foo";
        assert_eq!(
            extract_magnet_hash(source).as_deref(),
            Some("2089b05ecca3d829cedc70d0a1c4c76d5125e5e2")
        );
        assert_eq!(extract_magnet_hash("https://example.com/a.torrent"), None);
        assert_eq!(extract_magnet_hash("magnet:?dn=nohash"), None);
    }

    #[test]
    fn test_raw_torrent_decodes_with_missing_fields() {
        let torrent: RawTorrent = serde_json::from_str(r#"{"hash": "abc"}"#).unwrap();
        assert_eq!(torrent.eta, QBIT_ETA_INFINITY);
        assert_eq!(torrent.dlspeed, 0);
        assert_eq!(torrent.progress, 0.0);
    }
}
