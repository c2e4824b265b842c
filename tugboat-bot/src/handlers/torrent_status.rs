//! `/torrent_status <identifier>` - one-shot status lookup.

use tugboat_core::TugboatError;
use tugboat_core::daemon::DownloadId;
use tugboat_core::status::render_status;

use crate::dispatcher::{AppContext, reply};
use crate::telegram::Message;

const USAGE: &str = "Please provide a download identifier. \
    Usage: /torrent_status <identifier>";

pub async fn handle(ctx: &AppContext, message: &Message, args: &str) {
    let identifier = args.trim();
    if identifier.is_empty() {
        reply(ctx, message, USAGE).await;
        return;
    }

    let id = DownloadId::new(identifier);
    match ctx.daemon.fetch_one(&id).await {
        Ok(status) => {
            reply(ctx, message, &render_status(&status)).await;
        }
        Err(e) => {
            tracing::warn!(%id, "status lookup failed: {e}");
            reply(ctx, message, &TugboatError::from(e).user_message()).await;
        }
    }
}
