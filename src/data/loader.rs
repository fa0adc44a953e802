use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::aggregate::percentile;
use super::expand::token_count;
use super::model::{Catalog, CatalogRow, ContentKind, RatingRow};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Loader failures. Malformed individual cells never surface here: a cell
/// that fails numeric/date parsing becomes a missing value instead.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {0}")]
    MissingSource(PathBuf),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected a top-level JSON array of records in {0}")]
    JsonShape(PathBuf),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and normalize a full dataset: the catalog file plus an optional
/// ratings file joined onto it by normalized title.
///
/// A missing or unusable ratings source is not an error; the catalog simply
/// carries no scores. A missing catalog source is [`LoadError::MissingSource`].
pub fn load_dataset(catalog_path: &Path, ratings_path: Option<&Path>) -> Result<Catalog> {
    let mut rows = load_catalog(catalog_path)?;

    if let Some(path) = ratings_path {
        match load_ratings(path)? {
            Some(ratings) => {
                log::info!(
                    "joining {} ratings (score column '{}')",
                    ratings.rows.len(),
                    ratings.score_column
                );
                join_ratings(&mut rows, &ratings.rows);
            }
            None => log::info!("no usable ratings source, score disabled"),
        }
    }

    Ok(Catalog::from_rows(rows))
}

/// Load catalog rows from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with named columns (extra/missing columns tolerated)
/// * `.json` – records-oriented array `[{ "title": ..., ... }, ...]`
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_catalog_csv(path),
        "json" => load_catalog_json(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

/// Read a file as text: UTF-8 first, falling back to Latin-1 on invalid
/// UTF-8. Latin-1 maps every byte to a code point, so the fallback is total.
fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::MissingSource(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            log::warn!("{} is not valid UTF-8, decoding as Latin-1", path.display());
            Ok(err.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog – CSV
// ---------------------------------------------------------------------------

/// Column positions for the expected catalog schema. Any column may be
/// absent from the source file; absent text columns read as empty strings.
struct CatalogColumns {
    title: Option<usize>,
    kind: Option<usize>,
    country: Option<usize>,
    listed_in: Option<usize>,
    cast: Option<usize>,
    director: Option<usize>,
    description: Option<usize>,
    release_year: Option<usize>,
    date_added: Option<usize>,
}

impl CatalogColumns {
    fn locate(headers: &[String]) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        CatalogColumns {
            title: find("title"),
            kind: find("type"),
            country: find("country"),
            listed_in: find("listed_in"),
            cast: find("cast"),
            director: find("director"),
            description: find("description"),
            release_year: find("release_year"),
            date_added: find("date_added"),
        }
    }
}

fn load_catalog_csv(path: &Path) -> Result<Vec<CatalogRow>> {
    let text = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let cols = CatalogColumns::locate(&headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        rows.push(build_row(
            cell(cols.title),
            cell(cols.kind),
            cell(cols.country),
            cell(cols.listed_in),
            cell(cols.cast),
            cell(cols.director),
            cell(cols.description),
            parse_year(cell(cols.release_year)),
            parse_date(cell(cols.date_added)),
        ));
    }

    log::info!("loaded {} catalog rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Catalog – JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape produced by `to_json(orient="records")`:
/// an array of objects keyed by column name. Rows that are not objects are
/// skipped with a warning.
fn load_catalog_json(path: &Path) -> Result<Vec<CatalogRow>> {
    let text = read_text(path)?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::JsonShape(path.to_path_buf()))?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let Some(obj) = rec.as_object() else {
            log::warn!("{}: record {i} is not an object, skipped", path.display());
            continue;
        };

        let text_field = |key: &str| match obj.get(key) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let year = match obj.get("release_year") {
            Some(JsonValue::Number(n)) => n.as_f64().map(|v| v as i32),
            Some(JsonValue::String(s)) => parse_year(s),
            _ => None,
        };
        let date = match obj.get("date_added") {
            Some(JsonValue::String(s)) => parse_date(s),
            _ => None,
        };

        rows.push(build_row(
            &text_field("title"),
            &text_field("type"),
            &text_field("country"),
            &text_field("listed_in"),
            &text_field("cast"),
            &text_field("director"),
            &text_field("description"),
            year,
            date,
        ));
    }

    log::info!("loaded {} catalog rows from {}", rows.len(), path.display());
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Row construction and cell coercion
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn build_row(
    title: &str,
    kind: &str,
    country: &str,
    listed_in: &str,
    cast: &str,
    director: &str,
    description: &str,
    release_year: Option<i32>,
    date_added: Option<NaiveDate>,
) -> CatalogRow {
    CatalogRow {
        title: title.to_string(),
        kind: ContentKind::parse(kind),
        country: country.to_string(),
        listed_in: listed_in.to_string(),
        cast: cast.to_string(),
        director: director.to_string(),
        description: description.to_string(),
        release_year,
        date_added,
        n_countries: token_count(country),
        n_genres: token_count(listed_in),
        score: None,
    }
}

/// Coerce a release-year cell to an integer; unparseable becomes missing.
/// Accepts integer or float spellings ("2019", "2019.0").
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<i32>()
        .ok()
        .or_else(|| cell.parse::<f64>().ok().map(|v| v as i32))
}

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// Coerce a date cell to a date; unparseable becomes missing.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Score-column names accepted without resorting to the scale heuristic.
const SCORE_COLUMN_CANDIDATES: &[&str] = &[
    "score",
    "imdb_score",
    "tmdb_score",
    "rating",
    "averageRating",
    "vote_average",
];

/// A parsed ratings table with the column the score was read from.
#[derive(Debug, Clone)]
pub struct RatingsTable {
    pub score_column: String,
    pub rows: Vec<RatingRow>,
}

/// Load a ratings CSV. Returns `Ok(None)` when the file is absent, has no
/// `title` column, or no recognized/detected score column — all of which
/// simply disable score-dependent behavior downstream.
pub fn load_ratings(path: &Path) -> Result<Option<RatingsTable>> {
    let text = match read_text(path) {
        Ok(text) => text,
        Err(LoadError::MissingSource(_)) => return Ok(None),
        Err(err) => return Err(err),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let Some(title_idx) = headers.iter().position(|h| h.as_str() == "title") else {
        log::warn!("{} has no 'title' column, ratings ignored", path.display());
        return Ok(None);
    };

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?);
    }

    let Some(score_idx) = detect_score_column(&headers, &records, title_idx) else {
        log::warn!("{} has no usable score column, ratings ignored", path.display());
        return Ok(None);
    };

    // Rows whose score cell does not parse are dropped, not errors.
    let rows: Vec<RatingRow> = records
        .iter()
        .filter_map(|record| {
            let title = record.get(title_idx)?.trim();
            let score: f64 = record.get(score_idx)?.trim().parse().ok()?;
            if title.is_empty() {
                return None;
            }
            Some(RatingRow {
                title: title.to_string(),
                score,
            })
        })
        .collect();

    Ok(Some(RatingsTable {
        score_column: headers[score_idx].clone(),
        rows,
    }))
}

/// Pick the score column: a recognized name wins outright; otherwise the
/// first numeric column whose value distribution looks like a rating scale.
fn detect_score_column(
    headers: &[String],
    records: &[csv::StringRecord],
    title_idx: usize,
) -> Option<usize> {
    for candidate in SCORE_COLUMN_CANDIDATES {
        if let Some(idx) = headers.iter().position(|h| h.as_str() == *candidate) {
            return Some(idx);
        }
    }
    (0..headers.len())
        .filter(|&idx| idx != title_idx)
        .find(|&idx| {
            numeric_column(records, idx)
                .map(|values| looks_like_score_scale(&values))
                .unwrap_or(false)
        })
}

/// Collect a column as sorted floats, or `None` if any non-empty cell fails
/// to parse (the column is not numeric) or every cell is empty.
fn numeric_column(records: &[csv::StringRecord], idx: usize) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for record in records {
        let cell = record.get(idx).unwrap_or("").trim();
        if cell.is_empty() {
            continue;
        }
        values.push(cell.parse::<f64>().ok()?);
    }
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values)
}

/// Scale heuristic: 1st and 99th percentile both inside `[0, 10]` or both
/// inside `[0, 100]`. Best-effort by design; kept as an isolated predicate
/// so an explicit column mapping can replace it.
fn looks_like_score_scale(sorted: &[f64]) -> bool {
    let lo = percentile(sorted, 0.01);
    let hi = percentile(sorted, 0.99);
    let within = |bound: f64| (0.0..=bound).contains(&lo) && (0.0..=bound).contains(&hi);
    within(10.0) || within(100.0)
}

// ---------------------------------------------------------------------------
// Join and scale normalization
// ---------------------------------------------------------------------------

/// Join key: case-insensitive, whitespace-trimmed title.
fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Left-join ratings onto catalog rows by normalized title, then normalize
/// the scale: if the maximum joined score exceeds 10, every score is divided
/// by 10 (a 0–100 scale collapsed to 0–10). The scale decision is global,
/// made once over the whole joined column.
///
/// When several ratings share a normalized title, the first occurrence wins.
/// Ratings that match no catalog title are dropped silently.
pub fn join_ratings(rows: &mut [CatalogRow], ratings: &[RatingRow]) {
    let mut by_title: HashMap<String, f64> = HashMap::with_capacity(ratings.len());
    for rating in ratings {
        by_title
            .entry(normalize_title(&rating.title))
            .or_insert(rating.score);
    }

    for row in rows.iter_mut() {
        row.score = by_title.get(&normalize_title(&row.title)).copied();
    }

    let max = rows
        .iter()
        .filter_map(|r| r.score)
        .fold(f64::NEG_INFINITY, f64::max);
    if max > 10.0 {
        for row in rows.iter_mut() {
            if let Some(score) = &mut row.score {
                *score /= 10.0;
            }
        }
    }
}
