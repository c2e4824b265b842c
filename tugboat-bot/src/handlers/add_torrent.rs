//! `/add_torrent <magnet-or-url>` - submit a download and track its progress.

use std::sync::Arc;

use async_trait::async_trait;

use tugboat_core::TugboatError;
use tugboat_core::tracker::{ProgressSink, ProgressTracker, SinkError};

use crate::dispatcher::{AppContext, reply};
use crate::telegram::{Message, TelegramClient};

const USAGE: &str = "Please provide a torrent or magnet link. \
    Usage: /add_torrent <magnet-or-url>";

/// Edits the status message bound to one tracking session.
pub struct MessageEditorSink {
    telegram: Arc<TelegramClient>,
    chat_id: i64,
    message_id: i64,
}

#[async_trait]
impl ProgressSink for MessageEditorSink {
    async fn update(&mut self, text: &str) -> Result<(), SinkError> {
        self.telegram
            .edit_message_text(self.chat_id, self.message_id, text)
            .await
            .map_err(|e| SinkError {
                detail: e.to_string(),
            })
    }
}

pub async fn handle(ctx: &AppContext, message: &Message, args: &str) {
    let source = args.trim();
    if source.is_empty() {
        reply(ctx, message, USAGE).await;
        return;
    }

    let id = match ctx.daemon.submit(source).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("submission failed: {e}");
            reply(ctx, message, &TugboatError::from(e).user_message()).await;
            return;
        }
    };
    tracing::info!(%id, "download submitted");

    // This message becomes the tracking session's status display; every
    // subsequent update is an edit of it.
    let sent = match ctx
        .telegram
        .send_message(
            message.chat.id,
            &format!("Download accepted.\nId: {id}\nFetching details..."),
            Some(message.message_id),
            None,
        )
        .await
    {
        Ok(sent) => sent,
        Err(e) => {
            tracing::warn!(%id, "could not send status message: {e}");
            return;
        }
    };

    ctx.sessions.register(id.clone(), session_label(source));

    let tracker = ProgressTracker::new(
        Arc::clone(&ctx.daemon),
        ctx.tracker_config.clone(),
        id.clone(),
    );
    let mut sink = MessageEditorSink {
        telegram: Arc::clone(&ctx.telegram),
        chat_id: sent.chat.id,
        message_id: sent.message_id,
    };
    let sessions = Arc::clone(&ctx.sessions);

    tokio::spawn(async move {
        let outcome = tracker.run(&mut sink).await;
        tracing::info!(%id, ?outcome, "tracking session ended");
        sessions.unregister(&id);
    });
}

/// Registry display label: the source, shortened to something listable.
fn session_label(source: &str) -> String {
    const MAX: usize = 64;
    if source.len() <= MAX {
        return source.to_string();
    }
    let mut cut = MAX;
    while !source.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &source[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_label_passes_short_sources() {
        assert_eq!(session_label("magnet:?xt=urn:btih:abc"), "magnet:?xt=urn:btih:abc");
    }

    #[test]
    fn test_session_label_truncates_long_sources() {
        let long = "m".repeat(200);
        let label = session_label(&long);
        assert_eq!(label.len(), 67);
        assert!(label.ends_with("..."));
    }
}
