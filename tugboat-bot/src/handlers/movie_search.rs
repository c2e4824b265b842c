//! Free-text movie search and the detail-card callback.
//!
//! Any non-command text is treated as a search query. Results render as an
//! inline keyboard of `Title (Year)` buttons carrying the TMDB id as callback
//! data; pressing one edits the results message into a detail card.

use tugboat_search::errors::MediaSearchError;
use tugboat_search::types::MovieSummary;

use crate::dispatcher::{AppContext, reply};
use crate::telegram::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message};

const SEARCH_DISABLED: &str = "Movie search is not configured on this bot.";
const SEARCH_FAILED: &str =
    "An error occurred while searching for the movie. Please try again later.";
const NO_RESULTS: &str = "No results found for your query. Please refine your search.";
const DETAILS_FAILED: &str = "Unable to fetch movie details. Please try again later.";

pub async fn handle_search(ctx: &AppContext, message: &Message, query: &str) {
    if query.is_empty() {
        return;
    }
    tracing::info!(chat = message.chat.id, query, "movie search");

    let results = match ctx.search.search(query).await {
        Ok(results) => results,
        Err(MediaSearchError::Unavailable) => {
            reply(ctx, message, SEARCH_DISABLED).await;
            return;
        }
        Err(e) => {
            tracing::warn!(query, "movie search failed: {e}");
            reply(ctx, message, SEARCH_FAILED).await;
            return;
        }
    };

    if results.is_empty() {
        reply(ctx, message, NO_RESULTS).await;
        return;
    }

    let keyboard = result_keyboard(&results, ctx.search_result_limit);
    if let Err(e) = ctx
        .telegram
        .send_message(
            message.chat.id,
            &format!("Results for: {query}"),
            Some(message.message_id),
            Some(&keyboard),
        )
        .await
    {
        tracing::warn!("could not send search results: {e}");
    }
}

pub async fn handle_callback(ctx: &AppContext, callback: CallbackQuery) {
    // Stop the client-side spinner regardless of what happens next
    if let Err(e) = ctx.telegram.answer_callback_query(&callback.id).await {
        tracing::debug!("answerCallbackQuery failed: {e}");
    }

    let Some(message) = callback.message else {
        return;
    };
    let movie_id: Option<u64> = callback.data.as_deref().and_then(|data| data.parse().ok());

    let text = match movie_id {
        Some(movie_id) => match ctx.search.details(movie_id).await {
            Ok(details) => details.render(),
            Err(e) => {
                tracing::warn!(movie_id, "detail lookup failed: {e}");
                DETAILS_FAILED.to_string()
            }
        },
        None => DETAILS_FAILED.to_string(),
    };

    if let Err(e) = ctx
        .telegram
        .edit_message_text(message.chat.id, message.message_id, &text)
        .await
    {
        tracing::warn!("detail card edit failed: {e}");
    }
}

/// One button row per result, bounded by the configured page size.
fn result_keyboard(results: &[MovieSummary], limit: usize) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: results
            .iter()
            .take(limit)
            .map(|movie| vec![InlineKeyboardButton::new(movie.label(), movie.id.to_string())])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries(count: usize) -> Vec<MovieSummary> {
        (0..count)
            .map(|i| MovieSummary {
                id: i as u64,
                title: format!("Movie {i}"),
                release_year: Some(2000 + i as u16),
            })
            .collect()
    }

    #[test]
    fn test_result_keyboard_one_row_per_movie() {
        let keyboard = result_keyboard(&summaries(3), 25);
        assert_eq!(keyboard.inline_keyboard.len(), 3);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "Movie 0 (2000)");
        assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "0");
    }

    #[test]
    fn test_result_keyboard_respects_limit() {
        let keyboard = result_keyboard(&summaries(40), 25);
        assert_eq!(keyboard.inline_keyboard.len(), 25);
    }
}
