//! Scripted provider for tests.

use parking_lot::Mutex;

use super::MovieMetadataProvider;
use crate::errors::MediaSearchError;
use crate::types::{MovieDetails, MovieSummary};

/// Mock provider returning canned results, with an optional failure switch.
#[derive(Debug, Default)]
pub struct MockProvider {
    fail: Mutex<bool>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a network error.
    pub fn failing() -> Self {
        Self {
            fail: Mutex::new(true),
        }
    }
}

#[async_trait::async_trait]
impl MovieMetadataProvider for MockProvider {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MediaSearchError> {
        if *self.fail.lock() {
            return Err(MediaSearchError::NetworkError {
                reason: "mock outage".to_string(),
            });
        }
        if query == "nothing" {
            return Ok(Vec::new());
        }
        Ok(vec![
            MovieSummary {
                id: 603,
                title: "The Matrix".to_string(),
                release_year: Some(1999),
            },
            MovieSummary {
                id: 604,
                title: "The Matrix Reloaded".to_string(),
                release_year: Some(2003),
            },
        ])
    }

    async fn details(&self, id: u64) -> Result<MovieDetails, MediaSearchError> {
        if *self.fail.lock() {
            return Err(MediaSearchError::NetworkError {
                reason: "mock outage".to_string(),
            });
        }
        Ok(MovieDetails {
            title: format!("Movie {id}"),
            overview: Some("Mock overview.".to_string()),
            release_date: Some("1999-03-30".to_string()),
            rating: Some(8.7),
        })
    }
}
