//! Update dispatcher.
//!
//! One long-poll loop multiplexes everything: each update is handled on its
//! own cooperative task, so a tracking session sleeping between polls never
//! blocks command handling.

use std::sync::Arc;

use tugboat_core::config::TrackerConfig;
use tugboat_core::daemon::DaemonClient;
use tugboat_core::tracker::SessionRegistry;
use tugboat_search::MovieSearchService;

use crate::handlers;
use crate::telegram::{Message, TelegramClient, Update};

/// Shared process-wide collaborators handed to every handler.
pub struct AppContext {
    pub telegram: Arc<TelegramClient>,
    pub daemon: Arc<dyn DaemonClient>,
    pub search: Arc<MovieSearchService>,
    pub tracker_config: TrackerConfig,
    pub sessions: Arc<SessionRegistry>,
    /// Persisted process start timestamp (unix seconds)
    pub started_at: i64,
    /// Upper bound on inline keyboard rows per search reply
    pub search_result_limit: usize,
}

/// A chat command split into its name and argument tail.
#[derive(Debug, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

/// Parses `/command@botname arg arg` into name and args, `None` for free text.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.trim().strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    // Group chats address commands as /command@botname
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some(Command { name, args })
}

/// Runs the long-poll loop until the process exits.
pub async fn run(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let mut offset = 0i64;
    tracing::info!("dispatcher started");

    loop {
        match ctx.telegram.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let ctx = Arc::clone(&ctx);
                    tokio::spawn(async move {
                        handle_update(ctx, update).await;
                    });
                }
            }
            Err(e) => {
                tracing::warn!("getUpdates failed, backing off: {e}");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn handle_update(ctx: Arc<AppContext>, update: Update) {
    if let Some(callback) = update.callback_query {
        handlers::movie_search::handle_callback(&ctx, callback).await;
        return;
    }

    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text.clone() else {
        return;
    };

    match parse_command(&text) {
        Some(command) => dispatch_command(&ctx, &message, command).await,
        None => handlers::movie_search::handle_search(&ctx, &message, text.trim()).await,
    }
}

async fn dispatch_command(ctx: &AppContext, message: &Message, command: Command<'_>) {
    tracing::info!(chat = message.chat.id, command = command.name, "handling command");
    match command.name {
        "start" => handlers::start::handle(ctx, message).await,
        "status" => handlers::status::handle(ctx, message).await,
        "purge" => handlers::purge::handle(ctx, message).await,
        "add_torrent" => handlers::add_torrent::handle(ctx, message, command.args).await,
        "list_torrents" => handlers::list_torrents::handle(ctx, message).await,
        "torrent_status" => handlers::torrent_status::handle(ctx, message, command.args).await,
        other => {
            tracing::debug!(command = other, "ignoring unknown command");
        }
    }
}

/// Sends a reply, logging instead of propagating failures: every handler
/// produces at most one user-visible message and never crashes the loop.
pub async fn reply(ctx: &AppContext, message: &Message, text: &str) {
    if let Err(e) = ctx
        .telegram
        .send_message(message.chat.id, text, Some(message.message_id), None)
        .await
    {
        tracing::warn!(chat = message.chat.id, "reply failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let command = parse_command("/add_torrent magnet:?xt=urn:btih:abc").unwrap();
        assert_eq!(command.name, "add_torrent");
        assert_eq!(command.args, "magnet:?xt=urn:btih:abc");
    }

    #[test]
    fn test_parse_command_without_args() {
        let command = parse_command("/start").unwrap();
        assert_eq!(command.name, "start");
        assert_eq!(command.args, "");
    }

    #[test]
    fn test_parse_command_strips_bot_mention() {
        let command = parse_command("/status@tugboat_bot").unwrap();
        assert_eq!(command.name, "status");
    }

    #[test]
    fn test_parse_command_rejects_free_text() {
        assert!(parse_command("the matrix").is_none());
        assert!(parse_command("  /  ").is_none());
        assert!(parse_command("").is_none());
    }
}
