use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::expand::{explode, MultiField};
use super::model::CatalogRow;

// ---------------------------------------------------------------------------
// Summaries over a filtered subset
// ---------------------------------------------------------------------------
//
// Every function here takes the working subset (a row slice) and returns an
// empty/None result for an empty subset. Consumers render "no rows match"
// instead of aggregating nothing.

/// Headline counts for the KPI strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kpis {
    /// Rows in the working subset.
    pub titles: usize,
    /// Distinct non-empty country tokens.
    pub countries: usize,
    /// Distinct non-empty genre tokens.
    pub genres: usize,
}

pub fn kpis(rows: &[CatalogRow]) -> Kpis {
    let distinct = |field: MultiField| {
        explode(rows, field)
            .into_iter()
            .filter(|e| !e.token.is_empty())
            .map(|e| e.token)
            .collect::<BTreeSet<String>>()
            .len()
    };
    Kpis {
        titles: rows.len(),
        countries: distinct(MultiField::Country),
        genres: distinct(MultiField::Genre),
    }
}

/// Token frequencies for a multi-valued field, most frequent first (ties
/// broken alphabetically for a stable order). Empty tokens are excluded.
pub fn value_counts(rows: &[CatalogRow], field: MultiField) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in explode(rows, field) {
        if !entry.token.is_empty() {
            *counts.entry(entry.token).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// Release count per year, year-ascending. Rows without a year are skipped.
pub fn titles_per_year(rows: &[CatalogRow]) -> BTreeMap<i32, usize> {
    let mut per_year = BTreeMap::new();
    for row in rows {
        if let Some(year) = row.release_year {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }
    per_year
}

/// The `n` highest-scored rows, score-descending. Rows without a score are
/// skipped; ties keep catalog order.
pub fn top_rated<'a>(rows: &'a [CatalogRow], n: usize) -> Vec<&'a CatalogRow> {
    let mut scored: Vec<&CatalogRow> = rows.iter().filter(|r| r.score.is_some()).collect();
    scored.sort_by(|a, b| b.score.unwrap_or(f64::NAN).total_cmp(&a.score.unwrap_or(f64::NAN)));
    scored.truncate(n);
    scored
}

/// Equal-width histogram over the observed score range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Left edge of the first bin.
    pub start: f64,
    /// Width of each bin.
    pub width: f64,
    pub counts: Vec<usize>,
}

/// Histogram of the joined scores with `bins` equal-width bins. `None` when
/// no row carries a score or `bins` is zero. A degenerate range (all scores
/// equal) collapses into the first bin.
pub fn score_histogram(rows: &[CatalogRow], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let scores: Vec<f64> = rows.iter().filter_map(|r| r.score).collect();
    let (lo, hi) = scores
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })?;

    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
    let mut counts = vec![0usize; bins];
    for score in scores {
        let idx = (((score - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram {
        start: lo,
        width,
        counts,
    })
}

/// Country × genre co-occurrence, restricted to the `top_n` most frequent
/// values of each dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    /// Row labels, most frequent country first.
    pub countries: Vec<String>,
    /// Column labels, most frequent genre first.
    pub genres: Vec<String>,
    /// `counts[i][j]` = rows listing `countries[i]` and `genres[j]`.
    pub counts: Vec<Vec<usize>>,
}

pub fn cross_tab(rows: &[CatalogRow], top_n: usize) -> CrossTab {
    let countries: Vec<String> = value_counts(rows, MultiField::Country)
        .into_iter()
        .take(top_n)
        .map(|(token, _)| token)
        .collect();
    let genres: Vec<String> = value_counts(rows, MultiField::Genre)
        .into_iter()
        .take(top_n)
        .map(|(token, _)| token)
        .collect();

    // Double expansion: a row with C countries and G genres contributes to
    // C×G cells, mirroring exploding on both columns before pivoting.
    let country_pos: HashMap<&str, usize> =
        countries.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
    let genre_pos: HashMap<&str, usize> =
        genres.iter().enumerate().map(|(j, g)| (g.as_str(), j)).collect();

    let mut counts = vec![vec![0usize; genres.len()]; countries.len()];
    let by_genre = explode(rows, MultiField::Genre);
    let mut genres_per_row: HashMap<usize, Vec<usize>> = HashMap::new();
    for entry in &by_genre {
        if let Some(&j) = genre_pos.get(entry.token.as_str()) {
            genres_per_row.entry(entry.row).or_default().push(j);
        }
    }
    for entry in explode(rows, MultiField::Country) {
        let Some(&i) = country_pos.get(entry.token.as_str()) else {
            continue;
        };
        if let Some(js) = genres_per_row.get(&entry.row) {
            for &j in js {
                counts[i][j] += 1;
            }
        }
    }

    CrossTab {
        countries,
        genres,
        counts,
    }
}

/// Mean of the joined scores, `None` when no row carries a score.
pub fn mean_score(rows: &[CatalogRow]) -> Option<f64> {
    let scores: Vec<f64> = rows.iter().filter_map(|r| r.score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Median of the joined scores, `None` when no row carries a score.
pub fn median_score(rows: &[CatalogRow]) -> Option<f64> {
    let mut scores: Vec<f64> = rows.iter().filter_map(|r| r.score).collect();
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(f64::total_cmp);
    Some(percentile(&scores, 0.5))
}

// ---------------------------------------------------------------------------
// Description term frequencies
// ---------------------------------------------------------------------------

/// Words too generic to signal anything in catalog descriptions. Includes
/// common English function words plus domain filler.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "he", "her", "his", "in", "is",
    "it", "its", "of", "on", "or", "she", "that", "the", "their", "them", "they", "this", "to",
    "when", "where", "while", "who", "with", "after", "must", "into", "about", "him", "up",
    "out", "all", "are", "be", "has", "have", "not", "was", "were", "will", "young", "finds",
    // Domain filler that dominates every description.
    "film", "series", "movie", "netflix", "season", "year", "story", "one", "two", "new",
    "set", "based", "life",
];

/// Most frequent description terms, count-descending (ties alphabetical).
/// Terms are lowercased alphabetic runs; stopwords and single letters are
/// dropped. Feeds the word-cloud style summary.
pub fn term_counts(rows: &[CatalogRow], top_n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        for raw in row.description.split(|c: char| !c.is_alphabetic()) {
            if raw.len() < 2 {
                continue;
            }
            let word = raw.to_lowercase();
            if STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out.truncate(top_n);
    out
}

// ---------------------------------------------------------------------------
// Shared statistics
// ---------------------------------------------------------------------------

/// Linear-interpolated percentile over an already-sorted slice, `q` in
/// `[0, 1]`. The slice must be non-empty.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
