//! Error types for movie metadata search.

use thiserror::Error;

/// Errors that can occur during movie metadata operations.
#[derive(Debug, Error)]
pub enum MediaSearchError {
    /// Search operation failed with the specified query and reason.
    #[error("Search failed for query '{query}': {reason}")]
    SearchFailed { query: String, reason: String },

    /// Network communication error occurred during search.
    #[error("Network error: {reason}")]
    NetworkError { reason: String },

    /// Failed to parse search results or response data.
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Failed to fetch details for a selected movie.
    #[error("Metadata fetch failed: {reason}")]
    MetadataFetchFailed { reason: String },

    /// No API key configured; the feature is disabled for this process.
    #[error("Movie search is not configured")]
    Unavailable,
}
