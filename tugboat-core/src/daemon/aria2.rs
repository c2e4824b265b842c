//! aria2 JSON-RPC client.
//!
//! Single `/jsonrpc` endpoint, shared-secret token passed as the first
//! positional parameter. aria2 serializes every numeric field as a string and
//! exposes no ETA of its own; the adapter derives a time span from remaining
//! length and speed, which the normalizer reduces to integer seconds.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use super::{DaemonClient, DaemonError, DaemonHealth, DaemonKind, DownloadId, DownloadStatus, FileList};
use crate::config::DaemonConfig;
use crate::status::{self, ETA_SENTINEL, EtaValue};

/// aria2 JSON-RPC client.
#[derive(Debug)]
pub struct Aria2Client {
    endpoint: String,
    secret: String,
    client: reqwest::Client,
}

/// Download entry from `aria2.tellStatus` / `aria2.tellActive` and friends.
#[derive(Debug, Clone, Deserialize)]
struct RawDownload {
    gid: String,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "totalLength")]
    total_length: String,
    #[serde(default, rename = "completedLength")]
    completed_length: String,
    #[serde(default, rename = "downloadSpeed")]
    download_speed: String,
    #[serde(default)]
    files: Vec<RawFile>,
    #[serde(default)]
    bittorrent: Option<RawBittorrent>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawFile {
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBittorrent {
    #[serde(default)]
    info: Option<RawBittorrentInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawBittorrentInfo {
    #[serde(default)]
    name: String,
}

impl Aria2Client {
    /// Creates a client from daemon configuration.
    pub fn new(config: &DaemonConfig) -> Self {
        let host = config.aria2_host.trim_end_matches('/');
        let endpoint = if host.contains("://") {
            format!("{host}:{}/jsonrpc", config.aria2_port)
        } else {
            format!("http://{host}:{}/jsonrpc", config.aria2_port)
        };

        Self {
            endpoint,
            secret: config.aria2_secret.clone(),
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .expect("HTTP client creation should not fail"),
        }
    }

    /// One JSON-RPC round trip.
    ///
    /// # Errors
    /// - `DaemonError::Connectivity` - Transport or HTTP failure
    /// - `DaemonError::Auth` - Token rejected
    /// - `DaemonError::Rpc` - aria2 reported an error for the call
    /// - `DaemonError::InvalidResponse` - Body was not the expected shape
    async fn call(&self, method: &str, mut params: Vec<Value>) -> Result<Value, DaemonError> {
        if !self.secret.is_empty() {
            params.insert(0, Value::String(format!("token:{}", self.secret)));
        }

        let payload = json!({
            "jsonrpc": "2.0",
            "id": "tugboat",
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DaemonError::Connectivity {
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DaemonError::Connectivity {
                detail: format!("{method} failed with HTTP {}", response.status()),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DaemonError::InvalidResponse {
                detail: format!("{method} response was not JSON: {e}"),
            })?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown aria2 error")
                .to_string();
            if message.to_lowercase().contains("unauthorized") {
                return Err(DaemonError::Auth { detail: message });
            }
            return Err(DaemonError::Rpc { detail: message });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| DaemonError::InvalidResponse {
                detail: format!("{method} response missing result"),
            })
    }

    async fn tell(&self, method: &str, params: Vec<Value>) -> Result<Vec<DownloadStatus>, DaemonError> {
        let result = self.call(method, params).await?;
        let raw: Vec<RawDownload> =
            serde_json::from_value(result).map_err(|e| DaemonError::InvalidResponse {
                detail: format!("{method} decode failed: {e}"),
            })?;
        Ok(raw.into_iter().map(normalize).collect())
    }
}

/// aria2 emits numbers as JSON strings; absent or malformed means zero.
fn parse_len(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Display name: torrent metadata name, else first file path's base name,
/// else the GID itself.
fn display_name(raw: &RawDownload) -> String {
    if let Some(info) = raw.bittorrent.as_ref().and_then(|bt| bt.info.as_ref()) {
        if !info.name.is_empty() {
            return status::strip_metadata_marker(&info.name).to_string();
        }
    }

    raw.files
        .iter()
        .find(|f| !f.path.is_empty())
        .and_then(|f| {
            Path::new(&f.path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| raw.gid.clone())
}

/// Reduces a raw RPC download entry to the normalized status shape.
fn normalize(raw: RawDownload) -> DownloadStatus {
    let total = parse_len(&raw.total_length);
    let completed = parse_len(&raw.completed_length);
    let speed = parse_len(&raw.download_speed);

    let eta_seconds = if total > 0 && completed >= total {
        0
    } else if speed > 0 && total > completed {
        status::eta_seconds(EtaValue::Span(Duration::from_secs(
            (total - completed) / speed,
        )))
    } else {
        ETA_SENTINEL + 1
    };

    // An empty path list (or paths not yet named) means the magnet's metadata
    // has not resolved; that is the NotReady arm of the tri-state, not an
    // empty torrent.
    let paths: Vec<String> = raw
        .files
        .iter()
        .filter(|f| !f.path.is_empty())
        .map(|f| f.path.clone())
        .collect();
    let files = if paths.is_empty() && !status::is_terminal(&raw.status) {
        FileList::NotReady
    } else {
        FileList::Resolved(paths)
    };

    DownloadStatus {
        name: display_name(&raw),
        id: DownloadId::new(raw.gid),
        percent: status::percent_from_lengths(completed, total),
        state: raw.status,
        eta_seconds,
        speed_bps: speed,
        files,
    }
}

#[async_trait::async_trait]
impl DaemonClient for Aria2Client {
    fn kind(&self) -> DaemonKind {
        DaemonKind::Aria2
    }

    async fn submit(&self, source: &str) -> Result<DownloadId, DaemonError> {
        let params = vec![json!([source]), json!({})];
        let result = self.call("aria2.addUri", params).await.map_err(|e| match e {
            DaemonError::Rpc { detail } => DaemonError::Submission { detail },
            other => other,
        })?;

        result
            .as_str()
            .map(DownloadId::new)
            .ok_or_else(|| DaemonError::InvalidResponse {
                detail: "addUri result was not a GID string".to_string(),
            })
    }

    async fn list_all(&self) -> Result<Vec<DownloadStatus>, DaemonError> {
        let mut downloads = self.tell("aria2.tellActive", vec![]).await?;
        downloads.extend(
            self.tell("aria2.tellWaiting", vec![json!(0), json!(1000)])
                .await?,
        );
        downloads.extend(
            self.tell("aria2.tellStopped", vec![json!(0), json!(1000)])
                .await?,
        );
        Ok(downloads)
    }

    async fn fetch_one(&self, id: &DownloadId) -> Result<DownloadStatus, DaemonError> {
        let result = self
            .call("aria2.tellStatus", vec![json!(id.as_str())])
            .await
            .map_err(|e| match e {
                DaemonError::Rpc { detail } if detail.to_lowercase().contains("not found") => {
                    DaemonError::NotFound { id: id.clone() }
                }
                other => other,
            })?;

        let raw: RawDownload =
            serde_json::from_value(result).map_err(|e| DaemonError::InvalidResponse {
                detail: format!("tellStatus decode failed: {e}"),
            })?;

        if raw.status == "error" {
            return Err(DaemonError::Rpc {
                detail: raw
                    .error_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "download failed".to_string()),
            });
        }

        Ok(normalize(raw))
    }

    async fn remove(&self, id: &DownloadId, delete_files: bool) -> Result<(), DaemonError> {
        if delete_files {
            // The RPC surface has no file deletion; downloaded data stays on
            // disk for the operator to clean up.
            tracing::warn!(gid = %id, "aria2 RPC cannot delete downloaded files");
        }

        let removed = self.call("aria2.remove", vec![json!(id.as_str())]).await;
        match removed {
            Ok(_) => Ok(()),
            // Stopped downloads live in the result list and need the other call
            Err(DaemonError::Rpc { .. }) => {
                self.call("aria2.removeDownloadResult", vec![json!(id.as_str())])
                    .await
                    .map_err(|e| match e {
                        DaemonError::Rpc { detail } if detail.to_lowercase().contains("not found") => {
                            DaemonError::NotFound { id: id.clone() }
                        }
                        other => other,
                    })?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    async fn probe(&self) -> DaemonHealth {
        match self.call("aria2.getVersion", vec![]).await {
            Ok(result) => {
                let version = result
                    .get("version")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                DaemonHealth {
                    reachable: true,
                    authenticated: true,
                    detail: Some(format!("aria2 {version}")),
                }
            }
            Err(DaemonError::Auth { detail }) => DaemonHealth {
                reachable: true,
                authenticated: false,
                detail: Some(detail),
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

    fn raw_download(status: &str, total: &str, completed: &str, speed: &str) -> RawDownload {
        RawDownload {
            gid: "gid123".to_string(),
            status: status.to_string(),
            total_length: total.to_string(),
            completed_length: completed.to_string(),
            download_speed: speed.to_string(),
            files: vec![RawFile {
                path: "/downloads/a.mkv".to_string(),
            }],
            bittorrent: Some(RawBittorrent {
                info: Some(RawBittorrentInfo {
                    name: "Foo".to_string(),
                }),
            }),
            error_message: None,
        }
    }

    #[test]
    fn test_normalize_derives_eta_from_lengths_and_speed() {
        // 1000 bytes remaining at 8 bytes/sec = 125 seconds
        let status = normalize(raw_download("active", "2000", "1000", "8"));
        assert_eq!(status.eta_seconds, 125);
        assert_eq!(status.percent, 50.0);
        assert_eq!(status.speed_bps, 8);
        assert_eq!(status.name, "Foo");
    }

    #[test]
    fn test_normalize_zero_speed_means_unknown_eta() {
        let status = normalize(raw_download("active", "2000", "1000", "0"));
        assert!(status.eta_seconds > ETA_SENTINEL);
        assert_eq!(crate::status::format_eta(status.eta_seconds), "N/A");
    }

    #[test]
    fn test_normalize_zero_total_never_divides() {
        let status = normalize(raw_download("active", "0", "0", "0"));
        assert_eq!(status.percent, 0.0);
    }

    #[test]
    fn test_normalize_empty_paths_are_not_ready() {
        let mut raw = raw_download("active", "0", "0", "0");
        raw.files = vec![RawFile { path: String::new() }];
        raw.bittorrent = None;
        let status = normalize(raw);
        assert_eq!(status.files, FileList::NotReady);
        assert_eq!(status.name, "gid123");
    }

    #[test]
    fn test_normalize_strips_metadata_marker_from_name() {
        let mut raw = raw_download("active", "0", "0", "0");
        raw.bittorrent = Some(RawBittorrent {
            info: Some(RawBittorrentInfo {
                name: "[METADATA]Foo".to_string(),
            }),
        });
        assert_eq!(normalize(raw).name, "Foo");
    }

    #[test]
    fn test_raw_download_decodes_rpc_shape() {
        let raw: RawDownload = serde_json::from_str(
            r#"{
                "gid": "2089b05ecca3d829",
                "status": "active",
                "totalLength": "34896138",
                "completedLength": "34896138",
                "downloadSpeed": "0",
                "files": [{"path": "/downloads/file"}]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.gid, "2089b05ecca3d829");
        assert_eq!(parse_len(&raw.total_length), 34_896_138);
    }
}
