//! Provider implementations for movie metadata lookup.

use async_trait::async_trait;

use crate::errors::MediaSearchError;
use crate::types::{MovieDetails, MovieSummary};

pub mod mock;
pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers.
///
/// Implementations back the free-text search handler and the detail callback
/// through different sources (the TMDB API in production, scripted data in
/// tests).
#[async_trait]
pub trait MovieMetadataProvider: Send + Sync + std::fmt::Debug {
    /// Search for movies matching a free-text query.
    ///
    /// # Errors
    /// - `MediaSearchError::SearchFailed` - Search operation failed
    /// - `MediaSearchError::NetworkError` - Network connectivity issues
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MediaSearchError>;

    /// Fetch the detail card for one movie.
    ///
    /// # Errors
    /// - `MediaSearchError::MetadataFetchFailed` - Lookup or decode failed
    /// - `MediaSearchError::NetworkError` - Network connectivity issues
    async fn details(&self, id: u64) -> Result<MovieDetails, MediaSearchError>;
}
