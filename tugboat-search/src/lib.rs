//! Tugboat Search - Movie metadata lookup
//!
//! Wraps the TMDB API behind a provider trait so the chat handlers can run
//! free-text movie searches and detail lookups without knowing anything about
//! the wire format, and tests can substitute a scripted provider.

pub mod errors;
pub mod providers;
pub mod service;
pub mod types;

// Re-export main types
pub use errors::MediaSearchError;
pub use providers::MovieMetadataProvider;
pub use service::MovieSearchService;
pub use types::{MovieDetails, MovieSummary};

/// Convenience type alias for Results with MediaSearchError.
pub type Result<T> = std::result::Result<T, MediaSearchError>;
