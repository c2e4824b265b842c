//! Data types for movie metadata search.

use serde::{Deserialize, Serialize};

/// One row of a search result page, enough to render an inline button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub release_year: Option<u16>,
}

impl MovieSummary {
    /// Button label: `Title (1999)`, with `N/A` for unknown years.
    pub fn label(&self) -> String {
        match self.release_year {
            Some(year) => format!("{} ({year})", self.title),
            None => format!("{} (N/A)", self.title),
        }
    }
}

/// Detail card for a selected movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    /// Average rating on a 0-10 scale
    pub rating: Option<f32>,
}

impl MovieDetails {
    /// Renders the chat detail card.
    pub fn render(&self) -> String {
        let release = self.release_date.as_deref().unwrap_or("N/A");
        let rating = self
            .rating
            .map(|r| format!("{r:.1}/10"))
            .unwrap_or_else(|| "N/A".to_string());
        let overview = self
            .overview
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("No description available.");

        format!(
            "{}\nRelease Date: {release}\nRating: {rating}\n\n{overview}",
            self.title
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_label() {
        let with_year = MovieSummary {
            id: 603,
            title: "The Matrix".to_string(),
            release_year: Some(1999),
        };
        assert_eq!(with_year.label(), "The Matrix (1999)");

        let without_year = MovieSummary {
            id: 1,
            title: "Unreleased".to_string(),
            release_year: None,
        };
        assert_eq!(without_year.label(), "Unreleased (N/A)");
    }

    #[test]
    fn test_details_render() {
        let details = MovieDetails {
            title: "The Matrix".to_string(),
            overview: Some("A hacker learns the truth.".to_string()),
            release_date: Some("1999-03-30".to_string()),
            rating: Some(8.7),
        };
        let card = details.render();
        assert!(card.contains("The Matrix"));
        assert!(card.contains("1999-03-30"));
        assert!(card.contains("8.7/10"));
        assert!(card.contains("A hacker learns the truth."));
    }

    #[test]
    fn test_details_render_fills_gaps() {
        let details = MovieDetails {
            title: "Obscure".to_string(),
            overview: None,
            release_date: None,
            rating: None,
        };
        let card = details.render();
        assert!(card.contains("Release Date: N/A"));
        assert!(card.contains("Rating: N/A"));
        assert!(card.contains("No description available."));
    }
}
