//! Catalog item domain model.
//!
//! # Responsibility
//! - Define the remote-sourced detail record shown by the detail view.
//! - Derive display-ready values (rating label, poster source, stars).
//!
//! # Invariants
//! - `id` is the join key into the favorites store and never changes.
//! - `vote_average` stays within `0.0..=10.0` once validated.
//! - A record is immutable for the lifetime of the view that fetched it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable catalog identifier, as returned by the remote service.
pub type ItemId = u64;

/// Upper bound of the rating scale.
pub const MAX_VOTE_AVERAGE: f64 = 10.0;

/// Placeholder shown when an item carries no overview text.
pub const OVERVIEW_FALLBACK: &str = "No description available.";

/// Genre tag attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Detail record returned by the remote catalog.
///
/// Field names follow the wire format (`vote_average`, `poster_path`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Stable id used as the favorites key.
    pub id: ItemId,
    /// Required display title.
    pub title: String,
    /// Optional synopsis; blank values are treated as absent.
    #[serde(default)]
    pub overview: Option<String>,
    /// Rating on a `0..=10` scale.
    pub vote_average: f64,
    /// Opaque image reference resolved against the image base URL.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Optional external link; blank values disable the link affordance.
    #[serde(default)]
    pub homepage: Option<String>,
    /// Ordered genre list; missing on the wire means empty.
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValidationError {
    BlankTitle,
    VoteAverageOutOfRange(f64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "item title must not be blank"),
            Self::VoteAverageOutOfRange(value) => write!(
                f,
                "vote_average {value} is outside 0..={MAX_VOTE_AVERAGE}"
            ),
        }
    }
}

impl Error for ItemValidationError {}

/// Where the detail banner image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterSource {
    /// Fully resolved remote image URL.
    Remote(String),
    /// No poster reference; the presentation layer uses its bundled image.
    Fallback,
}

/// Star split for a ten-star, half-step rating widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarBreakdown {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl ItemRecord {
    /// Creates a record with only the required fields populated.
    pub fn new(id: ItemId, title: impl Into<String>, vote_average: f64) -> Self {
        Self {
            id,
            title: title.into(),
            overview: None,
            vote_average,
            poster_path: None,
            homepage: None,
            genres: Vec::new(),
        }
    }

    /// Validates fields the wire schema cannot express.
    ///
    /// # Errors
    /// - `BlankTitle` when `title` is empty after trimming.
    /// - `VoteAverageOutOfRange` when the rating is NaN or outside `0..=10`.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::BlankTitle);
        }
        if !(0.0..=MAX_VOTE_AVERAGE).contains(&self.vote_average) {
            return Err(ItemValidationError::VoteAverageOutOfRange(
                self.vote_average,
            ));
        }
        Ok(())
    }

    /// Rating formatted with one decimal, e.g. `7.5/10`.
    pub fn rating_label(&self) -> String {
        format!("{:.1}/10", self.vote_average)
    }

    /// Overview text, or the placeholder when absent or blank.
    pub fn overview_or_fallback(&self) -> &str {
        self.overview
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(OVERVIEW_FALLBACK)
    }

    /// Homepage link when present and non-blank.
    pub fn homepage_link(&self) -> Option<&str> {
        self.homepage
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }

    /// Whether the link-opening affordance should be enabled.
    pub fn has_homepage(&self) -> bool {
        self.homepage_link().is_some()
    }

    /// Resolves the poster reference against `image_base_url`.
    pub fn poster_source(&self, image_base_url: &str) -> PosterSource {
        let Some(path) = self
            .poster_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
        else {
            return PosterSource::Fallback;
        };

        PosterSource::Remote(format!(
            "{}/{}",
            image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    /// Splits the rating into full/half/empty stars on a ten-star scale.
    ///
    /// The rating is rounded to the nearest half star.
    pub fn star_breakdown(&self) -> StarBreakdown {
        let clamped = self.vote_average.clamp(0.0, MAX_VOTE_AVERAGE);
        let halves = (clamped * 2.0).round() as u8;
        let full = halves / 2;
        let half = halves % 2;
        StarBreakdown {
            full,
            half,
            empty: MAX_VOTE_AVERAGE as u8 - full - half,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemRecord, ItemValidationError, PosterSource, StarBreakdown, OVERVIEW_FALLBACK};

    #[test]
    fn rating_label_uses_one_decimal() {
        assert_eq!(ItemRecord::new(1, "x", 7.0).rating_label(), "7.0/10");
        assert_eq!(ItemRecord::new(1, "x", 6.24).rating_label(), "6.2/10");
    }

    #[test]
    fn blank_overview_falls_back_to_placeholder() {
        let mut item = ItemRecord::new(1, "x", 5.0);
        assert_eq!(item.overview_or_fallback(), OVERVIEW_FALLBACK);
        item.overview = Some("   ".to_string());
        assert_eq!(item.overview_or_fallback(), OVERVIEW_FALLBACK);
        item.overview = Some("A heist.".to_string());
        assert_eq!(item.overview_or_fallback(), "A heist.");
    }

    #[test]
    fn poster_source_joins_without_double_slash() {
        let mut item = ItemRecord::new(1, "x", 5.0);
        assert_eq!(
            item.poster_source("https://img.example/t/p/original"),
            PosterSource::Fallback
        );
        item.poster_path = Some("/abc.jpg".to_string());
        assert_eq!(
            item.poster_source("https://img.example/t/p/original/"),
            PosterSource::Remote("https://img.example/t/p/original/abc.jpg".to_string())
        );
    }

    #[test]
    fn blank_homepage_disables_link() {
        let mut item = ItemRecord::new(1, "x", 5.0);
        item.homepage = Some(String::new());
        assert!(!item.has_homepage());
        item.homepage = Some("https://example.com".to_string());
        assert_eq!(item.homepage_link(), Some("https://example.com"));
    }

    #[test]
    fn star_breakdown_rounds_to_half_stars() {
        assert_eq!(
            ItemRecord::new(1, "x", 7.5).star_breakdown(),
            StarBreakdown {
                full: 7,
                half: 1,
                empty: 2
            }
        );
        assert_eq!(
            ItemRecord::new(1, "x", 10.0).star_breakdown(),
            StarBreakdown {
                full: 10,
                half: 0,
                empty: 0
            }
        );
    }

    #[test]
    fn validate_rejects_out_of_range_rating_and_blank_title() {
        assert_eq!(
            ItemRecord::new(1, "x", 10.5).validate(),
            Err(ItemValidationError::VoteAverageOutOfRange(10.5))
        );
        assert_eq!(
            ItemRecord::new(1, " ", 5.0).validate(),
            Err(ItemValidationError::BlankTitle)
        );
        assert!(ItemRecord::new(1, "x", 0.0).validate().is_ok());
    }

    #[test]
    fn missing_optional_wire_fields_default() {
        let item: ItemRecord =
            serde_json::from_str(r#"{"id":42,"title":"X","vote_average":7.5}"#).unwrap();
        assert_eq!(item.id, 42);
        assert!(item.genres.is_empty());
        assert!(item.overview.is_none());
    }
}
