//! `/purge` - bulk-delete a range of chat messages.
//!
//! Must be issued as a reply: the replied-to message is the range start, the
//! command message is the (exclusive) end. Deletes fan out in small concurrent
//! batches; a message that is already gone counts as a failure for that one
//! message and never aborts the rest of the batch.

use futures::future::join_all;

use crate::dispatcher::{AppContext, reply};
use crate::telegram::Message;

const NEEDS_REPLY: &str = "Please reply to a message to specify where to start purging.";

/// Per-batch fan-out width; also the feedback edit cadence.
const BATCH_SIZE: usize = 5;

pub async fn handle(ctx: &AppContext, message: &Message) {
    let Some(range_start) = message.reply_to_message.as_deref() else {
        reply(ctx, message, NEEDS_REPLY).await;
        return;
    };

    let chat_id = message.chat.id;
    let targets = purge_targets(range_start.message_id, message.message_id);
    tracing::info!(
        chat = chat_id,
        from = range_start.message_id,
        to = message.message_id,
        count = targets.len(),
        "purging messages"
    );

    let feedback = match ctx
        .telegram
        .send_message(chat_id, "Purging messages...", None, None)
        .await
    {
        Ok(sent) => sent,
        Err(e) => {
            tracing::warn!("could not send purge feedback message: {e}");
            return;
        }
    };

    let mut deleted = 0usize;
    let mut failed = 0usize;
    let mut remaining = targets.len();

    for batch in targets.chunks(BATCH_SIZE) {
        let deletions = batch
            .iter()
            .map(|&message_id| ctx.telegram.delete_message(chat_id, message_id));

        for (message_id, outcome) in batch.iter().zip(join_all(deletions).await) {
            match outcome {
                Ok(()) => deleted += 1,
                Err(e) => {
                    failed += 1;
                    tracing::debug!(message_id, "delete failed: {e}");
                }
            }
        }
        remaining -= batch.len();

        let progress = progress_text(deleted, failed, remaining);
        if let Err(e) = ctx
            .telegram
            .edit_message_text(chat_id, feedback.message_id, &progress)
            .await
        {
            tracing::debug!("purge progress edit failed: {e}");
        }
    }

    let summary = summary_text(deleted, failed);
    tracing::info!(chat = chat_id, deleted, failed, "purge finished");
    if let Err(e) = ctx
        .telegram
        .edit_message_text(chat_id, feedback.message_id, &summary)
        .await
    {
        tracing::warn!("purge summary edit failed: {e}");
    }
}

/// Message ids to delete: the range start itself, then everything strictly
/// between it and the command message.
fn purge_targets(start_id: i64, command_id: i64) -> Vec<i64> {
    if command_id <= start_id {
        return vec![start_id];
    }
    (start_id..command_id).collect()
}

fn progress_text(deleted: usize, failed: usize, remaining: usize) -> String {
    format!("Purging messages...\nDeleted: {deleted}\nFailed: {failed}\nRemaining: {remaining}")
}

fn summary_text(deleted: usize, failed: usize) -> String {
    format!("Purge complete!\nTotal Deleted: {deleted}\nFailed Deletions: {failed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purge_targets_cover_start_to_command_exclusive() {
        assert_eq!(purge_targets(10, 14), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_purge_targets_adjacent_messages() {
        // Replying to the immediately preceding message deletes just it
        assert_eq!(purge_targets(10, 11), vec![10]);
    }

    #[test]
    fn test_purge_targets_inverted_range_still_deletes_start() {
        assert_eq!(purge_targets(14, 10), vec![14]);
    }

    #[test]
    fn test_progress_and_summary_text() {
        assert_eq!(
            progress_text(7, 1, 3),
            "Purging messages...\nDeleted: 7\nFailed: 1\nRemaining: 3"
        );
        assert_eq!(
            summary_text(8, 1),
            "Purge complete!\nTotal Deleted: 8\nFailed Deletions: 1"
        );
    }
}
