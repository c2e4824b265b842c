//! `/list_torrents` - snapshot of everything the daemon knows.

use tugboat_core::TugboatError;
use tugboat_core::daemon::DownloadStatus;
use tugboat_core::status::format_percent;

use crate::dispatcher::{AppContext, reply};
use crate::telegram::Message;

/// Telegram caps messages at 4096 chars; leave room for the truncation notice.
const REPLY_LIMIT: usize = 4000;

const TRUNCATION_NOTICE: &str = "\n\nMessage truncated due to length.";

pub async fn handle(ctx: &AppContext, message: &Message) {
    match ctx.daemon.list_all().await {
        Ok(downloads) => {
            reply(ctx, message, &render_listing(&downloads)).await;
        }
        Err(e) => {
            tracing::warn!("listing failed: {e}");
            reply(ctx, message, &TugboatError::from(e).user_message()).await;
        }
    }
}

fn render_listing(downloads: &[DownloadStatus]) -> String {
    if downloads.is_empty() {
        return "No active downloads.".to_string();
    }

    let blocks: Vec<String> = downloads
        .iter()
        .map(|d| {
            format!(
                "Name: {}\nProgress: {}\nState: {}",
                d.name,
                format_percent(d.percent),
                d.state
            )
        })
        .collect();

    let mut text = blocks.join("\n\n");
    if text.len() > REPLY_LIMIT {
        let mut cut = REPLY_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str(TRUNCATION_NOTICE);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tugboat_core::daemon::{DownloadId, FileList};

    fn download(name: &str, percent: f64, state: &str) -> DownloadStatus {
        DownloadStatus {
            id: DownloadId::new("abc"),
            name: name.to_string(),
            percent,
            state: state.to_string(),
            eta_seconds: 0,
            speed_bps: 0,
            files: FileList::Resolved(vec![]),
        }
    }

    #[test]
    fn test_render_listing_empty() {
        assert_eq!(render_listing(&[]), "No active downloads.");
    }

    #[test]
    fn test_render_listing_formats_blocks() {
        let text = render_listing(&[
            download("First", 12.5, "downloading"),
            download("Second", 100.0, "seeding"),
        ]);
        assert!(text.contains("Name: First\nProgress: 12.50%\nState: downloading"));
        assert!(text.contains("Name: Second\nProgress: 100.00%\nState: seeding"));
    }

    #[test]
    fn test_render_listing_truncates_near_telegram_limit() {
        let many: Vec<DownloadStatus> = (0..200)
            .map(|i| download(&format!("Download-{i:03}-{}", "x".repeat(40)), 50.0, "downloading"))
            .collect();
        let text = render_listing(&many);
        assert!(text.len() <= REPLY_LIMIT + TRUNCATION_NOTICE.len());
        assert!(text.ends_with(TRUNCATION_NOTICE));
    }
}
