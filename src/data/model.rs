use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expand::split_tokens;

// ---------------------------------------------------------------------------
// ContentKind – the `type` column of the catalog
// ---------------------------------------------------------------------------

/// Kind of catalog entry. The source column is free text; anything other
/// than the two known labels is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Movie,
    TvShow,
    Other(String),
}

impl ContentKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Movie" => ContentKind::Movie,
            "TV Show" => ContentKind::TvShow,
            other => ContentKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "Movie"),
            ContentKind::TvShow => write!(f, "TV Show"),
            ContentKind::Other(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogRow – one row of the normalized catalog table
// ---------------------------------------------------------------------------

/// One content item after normalization.
///
/// Text columns are never null: a missing cell becomes an empty string so
/// string operations downstream stay total. `country` and `listed_in` keep
/// their raw comma-delimited form; [`super::expand`] is the single place
/// that turns them into tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRow {
    pub title: String,
    pub kind: ContentKind,
    /// Raw comma-delimited country list (possibly empty).
    pub country: String,
    /// Raw comma-delimited genre list (possibly empty).
    pub listed_in: String,
    pub cast: String,
    pub director: String,
    pub description: String,
    pub release_year: Option<i32>,
    pub date_added: Option<NaiveDate>,
    /// Count of non-empty trimmed tokens in `country`.
    pub n_countries: usize,
    /// Count of non-empty trimmed tokens in `listed_in`.
    pub n_genres: usize,
    /// Joined rating on a 0–10 scale, if a ratings source matched.
    pub score: Option<f64>,
}

// ---------------------------------------------------------------------------
// RatingRow – one row of the external ratings table
// ---------------------------------------------------------------------------

/// External score record. The scale is unknown a priori (0–10 or 0–100);
/// [`super::loader::join_ratings`] normalizes it after the join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRow {
    pub title: String,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Catalog – the complete normalized dataset
// ---------------------------------------------------------------------------

/// Fallback year range when the catalog carries no usable release years.
pub const DEFAULT_YEAR_RANGE: (i32, i32) = (1950, 2025);

/// The full normalized catalog with pre-computed filter options.
///
/// Immutable once built; filtering produces index lists or owned subsets,
/// never mutates the catalog itself.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// All normalized rows.
    pub rows: Vec<CatalogRow>,
    /// Sorted unique country tokens across all rows (empties excluded).
    pub countries: BTreeSet<String>,
    /// Sorted unique genre tokens across all rows (empties excluded).
    pub genres: BTreeSet<String>,
}

impl Catalog {
    /// Build the catalog and its filter-option indices from loaded rows.
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        let mut countries = BTreeSet::new();
        let mut genres = BTreeSet::new();
        for row in &rows {
            countries.extend(split_tokens(&row.country));
            genres.extend(split_tokens(&row.listed_in));
        }
        Catalog {
            rows,
            countries,
            genres,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries a joined score.
    pub fn has_scores(&self) -> bool {
        self.rows.iter().any(|r| r.score.is_some())
    }

    /// Observed `[min, max]` release-year range, or [`DEFAULT_YEAR_RANGE`]
    /// when no row has a usable year.
    pub fn year_range(&self) -> (i32, i32) {
        let mut years = self.rows.iter().filter_map(|r| r.release_year);
        let first = match years.next() {
            Some(y) => y,
            None => return DEFAULT_YEAR_RANGE,
        };
        let (lo, hi) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        (lo, hi)
    }

    /// Default score range for the filter surface: 1st/99th percentile of
    /// the joined scores, rounded to 0.1 and clamped to `[0, 10]`.
    /// `None` when no score was joined.
    pub fn default_score_range(&self) -> Option<(f64, f64)> {
        let mut scores: Vec<f64> = self.rows.iter().filter_map(|r| r.score).collect();
        if scores.is_empty() {
            return None;
        }
        scores.sort_by(f64::total_cmp);
        let lo = super::aggregate::percentile(&scores, 0.01);
        let hi = super::aggregate::percentile(&scores, 0.99);
        let round1 = |v: f64| (v * 10.0).round() / 10.0;
        Some((round1(lo).max(0.0), round1(hi).min(10.0)))
    }
}
