//! Movie search service.
//!
//! Owns the configured provider and the disabled mode: a process started
//! without a TMDB API key still answers movie searches, just with a fixed
//! "not configured" outcome instead of results.

use crate::errors::MediaSearchError;
use crate::providers::{MovieMetadataProvider, TmdbProvider};
use crate::types::{MovieDetails, MovieSummary};
use tugboat_core::config::SearchConfig;

/// Movie metadata service handed to the chat handlers.
#[derive(Debug)]
pub struct MovieSearchService {
    provider: Option<Box<dyn MovieMetadataProvider>>,
}

impl MovieSearchService {
    /// Creates the service from configuration.
    ///
    /// Without an API key the service comes up disabled; handlers surface a
    /// fixed notice instead of results and nothing else changes.
    pub fn from_config(config: &SearchConfig) -> Self {
        match config.tmdb_api_key.clone() {
            Some(api_key) if !api_key.is_empty() => Self {
                provider: Some(Box::new(TmdbProvider::new(api_key, config))),
            },
            _ => {
                tracing::warn!("TMDB_API_KEY not set; movie search disabled");
                Self { provider: None }
            }
        }
    }

    /// Creates the service around an explicit provider (used by tests).
    pub fn with_provider(provider: Box<dyn MovieMetadataProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Whether a provider is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Free-text movie search.
    ///
    /// # Errors
    /// - `MediaSearchError::Unavailable` - No API key configured
    /// - `MediaSearchError::SearchFailed` - Provider query failed
    /// - `MediaSearchError::NetworkError` - Network connectivity issues
    pub async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MediaSearchError> {
        match &self.provider {
            Some(provider) => provider.search(query).await,
            None => Err(MediaSearchError::Unavailable),
        }
    }

    /// Detail lookup for a selected movie.
    ///
    /// # Errors
    /// - `MediaSearchError::Unavailable` - No API key configured
    /// - `MediaSearchError::MetadataFetchFailed` - Lookup failed
    pub async fn details(&self, id: u64) -> Result<MovieDetails, MediaSearchError> {
        match &self.provider {
            Some(provider) => provider.details(id).await,
            None => Err(MediaSearchError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    #[tokio::test]
    async fn test_disabled_service_reports_unavailable() {
        let service = MovieSearchService::from_config(&SearchConfig::default());
        assert!(!service.is_enabled());
        assert!(matches!(
            service.search("anything").await,
            Err(MediaSearchError::Unavailable)
        ));
        assert!(matches!(
            service.details(603).await,
            Err(MediaSearchError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_search_returns_provider_results() {
        let service = MovieSearchService::with_provider(Box::new(MockProvider::new()));
        let results = service.search("matrix").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label(), "The Matrix (1999)");
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let service = MovieSearchService::with_provider(Box::new(MockProvider::failing()));
        assert!(matches!(
            service.search("matrix").await,
            Err(MediaSearchError::NetworkError { .. })
        ));
    }
}
