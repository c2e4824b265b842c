//! Tugboat - chat-driven torrent delegation bot
//!
//! Builds the Telegram client and daemon adapter from configuration,
//! registers nothing persistent beyond the start timestamp, and hands
//! control to the long-poll dispatcher.

mod dispatcher;
mod handlers;
mod telegram;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use tugboat_core::config::TugboatConfig;
use tugboat_core::daemon::client_from_config;
use tugboat_core::tracing_setup::{self, CliLogLevel};
use tugboat_core::tracker::SessionRegistry;
use tugboat_core::uptime;
use tugboat_search::MovieSearchService;

use crate::dispatcher::AppContext;
use crate::telegram::TelegramClient;

#[derive(Parser)]
#[command(name = "tugboat")]
#[command(about = "Chat bot that delegates downloads to a torrent daemon")]
struct Cli {
    /// Console log level
    #[arg(long, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.log_level.as_tracing_level(), None)
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let config = TugboatConfig::from_env();

    // The bot token is the only configuration whose absence stops the process
    let token = config
        .telegram
        .bot_token
        .clone()
        .context("TELEGRAM_BOT_TOKEN is required")?;

    let telegram = Arc::new(TelegramClient::new(&token, &config.telegram));
    let me = telegram
        .get_me()
        .await
        .context("could not reach the Telegram Bot API with the configured token")?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or("<unnamed>"),
        "authenticated with Telegram"
    );

    let daemon = client_from_config(&config.daemon);
    let health = daemon.probe().await;
    if health.reachable && health.authenticated {
        tracing::info!(kind = %daemon.kind(), detail = ?health.detail, "daemon reachable");
    } else {
        // Degraded, not fatal: the daemon may come up later and /status
        // reports the live state either way
        tracing::warn!(
            kind = %daemon.kind(),
            detail = ?health.detail,
            "daemon not reachable at startup"
        );
    }

    let search = Arc::new(MovieSearchService::from_config(&config.search));
    let started_at = uptime::load_or_init(&TugboatConfig::state_file());

    let ctx = Arc::new(AppContext {
        telegram,
        daemon,
        search,
        tracker_config: config.tracker.clone(),
        sessions: Arc::new(SessionRegistry::new()),
        started_at,
        search_result_limit: config.search.result_limit,
    });

    tracing::info!("Tugboat is starting...");
    dispatcher::run(ctx).await
}
