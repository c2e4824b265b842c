//! `/start` - welcome message.

use crate::dispatcher::{AppContext, reply};
use crate::telegram::Message;

const WELCOME: &str = "Welcome to Tugboat!\n\
    Send /add_torrent <magnet-or-url> to start a download, \
    or type a movie name to search.";

pub async fn handle(ctx: &AppContext, message: &Message) {
    reply(ctx, message, WELCOME).await;
}
