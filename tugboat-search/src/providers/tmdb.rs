//! TMDB metadata provider.
//!
//! Plain HTTPS JSON calls against the v3 API: `/search/movie` for free-text
//! queries and `/movie/{id}` for detail cards.

use serde::{Deserialize, Serialize};

use super::MovieMetadataProvider;
use crate::errors::MediaSearchError;
use crate::types::{MovieDetails, MovieSummary};
use tugboat_core::config::SearchConfig;

/// TMDB API client.
#[derive(Debug, Clone)]
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    base: String,
    language: String,
}

/// Response from `/search/movie`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchEntry {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    release_date: Option<String>,
}

/// Response from `/movie/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: Option<f32>,
}

impl TmdbProvider {
    /// Creates a TMDB provider with an explicit API key.
    pub fn new(api_key: String, config: &SearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base: config.api_base.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    /// First four digits of a `YYYY-MM-DD` release date, when parseable.
    fn release_year(release_date: Option<&str>) -> Option<u16> {
        release_date
            .and_then(|date| date.split('-').next())
            .and_then(|year| year.parse().ok())
    }
}

#[async_trait::async_trait]
impl MovieMetadataProvider for TmdbProvider {
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, MediaSearchError> {
        let url = format!(
            "{}/search/movie?api_key={}&language={}&query={}",
            self.base,
            self.api_key,
            self.language,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            MediaSearchError::NetworkError {
                reason: format!("HTTP request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(MediaSearchError::SearchFailed {
                query: query.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let search: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| MediaSearchError::ParseError {
                    reason: format!("JSON parsing failed: {e}"),
                })?;

        Ok(search
            .results
            .into_iter()
            .map(|entry| MovieSummary {
                release_year: Self::release_year(entry.release_date.as_deref()),
                id: entry.id,
                title: entry.title,
            })
            .collect())
    }

    async fn details(&self, id: u64) -> Result<MovieDetails, MediaSearchError> {
        let url = format!(
            "{}/movie/{id}?api_key={}&language={}",
            self.base, self.api_key, self.language
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            MediaSearchError::NetworkError {
                reason: format!("HTTP request failed: {e}"),
            }
        })?;

        if !response.status().is_success() {
            return Err(MediaSearchError::MetadataFetchFailed {
                reason: format!("HTTP {}", response.status()),
            });
        }

        let details: DetailsResponse =
            response
                .json()
                .await
                .map_err(|e| MediaSearchError::ParseError {
                    reason: format!("JSON parsing failed: {e}"),
                })?;

        Ok(MovieDetails {
            title: details.title,
            overview: details.overview.filter(|o| !o.is_empty()),
            release_date: details.release_date.filter(|d| !d.is_empty()),
            rating: details.vote_average,
        })
    }
}
