//! `/status` - daemon health and bot uptime.

use tugboat_core::daemon::DaemonHealth;
use tugboat_core::uptime::format_uptime;

use crate::dispatcher::{AppContext, reply};
use crate::telegram::Message;

pub async fn handle(ctx: &AppContext, message: &Message) {
    let health = ctx.daemon.probe().await;
    let uptime = format_uptime(ctx.started_at, chrono::Utc::now().timestamp());
    let text = render_status(&health, &uptime, ctx.sessions.len());
    reply(ctx, message, &text).await;
}

fn render_status(health: &DaemonHealth, uptime: &str, active_sessions: usize) -> String {
    let api_status = if health.reachable { "Online" } else { "Offline" };
    let connection_status = if health.authenticated {
        "Connected"
    } else {
        "Not Connected"
    };

    let mut text = format!(
        "API Status: {api_status}\n\
         Connection Status: {connection_status}\n\
         Bot Uptime: {uptime}\n\
         Active Trackers: {active_sessions}"
    );
    if let Some(detail) = &health.detail {
        text.push_str(&format!("\nDetail: {detail}"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_status_healthy() {
        let health = DaemonHealth {
            reachable: true,
            authenticated: true,
            detail: Some("qBittorrent v4.6.0".to_string()),
        };
        let text = render_status(&health, "3h 42m", 2);
        assert!(text.contains("API Status: Online"));
        assert!(text.contains("Connection Status: Connected"));
        assert!(text.contains("Bot Uptime: 3h 42m"));
        assert!(text.contains("Active Trackers: 2"));
        assert!(text.contains("qBittorrent v4.6.0"));
    }

    #[test]
    fn test_render_status_unreachable() {
        let health = DaemonHealth {
            reachable: false,
            authenticated: false,
            detail: Some("connection refused".to_string()),
        };
        let text = render_status(&health, "0h 1m", 0);
        assert!(text.contains("API Status: Offline"));
        assert!(text.contains("Connection Status: Not Connected"));
        assert!(text.contains("connection refused"));
    }
}
