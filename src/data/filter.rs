use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::expand::split_tokens;
use super::model::{Catalog, CatalogRow};

// ---------------------------------------------------------------------------
// FilterSpec – the active user selection
// ---------------------------------------------------------------------------

/// The full set of active constraints for one evaluation.
///
/// Built once per user interaction and passed by value into the engine;
/// never mutated in place while filtering. An empty country/genre set means
/// "no constraint" for that dimension, which is distinct from a selection
/// that matches nothing. The year range is always active; the score range
/// only when `Some` (i.e. when a ratings source was joined).
///
/// Serializable so selections can be saved and restored as presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub countries: BTreeSet<String>,
    pub genres: BTreeSet<String>,
    /// Inclusive release-year range `[y0, y1]`.
    pub years: (i32, i32),
    /// Inclusive score range `[s0, s1]`, if scores are available.
    pub score: Option<(f64, f64)>,
}

impl FilterSpec {
    /// The widest selection for a catalog: no country/genre constraint, the
    /// full observed year range, and the catalog's default score range when
    /// scores are present.
    pub fn unconstrained(catalog: &Catalog) -> Self {
        FilterSpec {
            countries: BTreeSet::new(),
            genres: BTreeSet::new(),
            years: catalog.year_range(),
            score: catalog.default_score_range(),
        }
    }

    /// Serialize as a JSON preset.
    pub fn to_preset(&self) -> String {
        // FilterSpec contains only plain collections; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Restore from a JSON preset.
    pub fn from_preset(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Filter evaluation
// ---------------------------------------------------------------------------

/// Whether one row satisfies every active constraint.
///
/// * Year: kept iff the year is present and inside the inclusive range, so
///   rows with a missing year are always excluded.
/// * Country/genre: with a non-empty selection, at least one token of the
///   row's field must exactly match a selected value.
/// * Score: with an active range, a missing score excludes the row.
fn row_matches(row: &CatalogRow, spec: &FilterSpec) -> bool {
    let (y0, y1) = spec.years;
    match row.release_year {
        Some(year) if y0 <= year && year <= y1 => {}
        _ => return false,
    }

    if !spec.countries.is_empty()
        && !split_tokens(&row.country)
            .iter()
            .any(|token| spec.countries.contains(token))
    {
        return false;
    }

    if !spec.genres.is_empty()
        && !split_tokens(&row.listed_in)
            .iter()
            .any(|token| spec.genres.contains(token))
    {
        return false;
    }

    if let Some((s0, s1)) = spec.score {
        match row.score {
            Some(score) if s0 <= score && score <= s1 => {}
            _ => return false,
        }
    }

    true
}

/// Return indices of catalog rows that pass all active constraints.
pub fn filtered_indices(catalog: &Catalog, spec: &FilterSpec) -> Vec<usize> {
    catalog
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, spec))
        .map(|(i, _)| i)
        .collect()
}

/// The working subset: owned rows passing all active constraints, in
/// catalog order. Aggregation consumers operate on this slice.
pub fn apply(catalog: &Catalog, spec: &FilterSpec) -> Vec<CatalogRow> {
    catalog
        .rows
        .iter()
        .filter(|row| row_matches(row, spec))
        .cloned()
        .collect()
}
