use super::model::CatalogRow;

// ---------------------------------------------------------------------------
// Tokenization of comma-delimited multi-value cells
// ---------------------------------------------------------------------------

/// Split a comma-delimited cell into trimmed, non-empty tokens.
///
/// This is the single tokenization rule for multi-value columns: split on
/// `,` only, trim whitespace, drop empty tokens, preserve case. Duplicate
/// tokens are kept (distinct positions count separately).
pub fn split_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of non-empty trimmed tokens in a multi-value cell.
pub fn token_count(raw: &str) -> usize {
    raw.split(',').filter(|t| !t.trim().is_empty()).count()
}

// ---------------------------------------------------------------------------
// Row expansion: one row per token
// ---------------------------------------------------------------------------

/// The multi-valued catalog columns that can be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiField {
    Country,
    Genre,
}

impl MultiField {
    /// The raw comma-delimited cell for this field.
    pub fn raw<'a>(&self, row: &'a CatalogRow) -> &'a str {
        match self {
            MultiField::Country => &row.country,
            MultiField::Genre => &row.listed_in,
        }
    }
}

/// One entry of an expanded table: a single token plus the index of the
/// source row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exploded {
    pub token: String,
    pub row: usize,
}

/// Expand rows on a multi-valued field: each row contributes one entry per
/// non-empty trimmed token of that field.
///
/// A row whose field is empty after trimming still contributes exactly one
/// entry with an empty token, so the output always covers every source row
/// and `output.len() == sum(max(1, token_count))`. Consumers that only want
/// real tokens filter the empties out explicitly.
pub fn explode(rows: &[CatalogRow], field: MultiField) -> Vec<Exploded> {
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let tokens = split_tokens(field.raw(row));
        if tokens.is_empty() {
            out.push(Exploded {
                token: String::new(),
                row: i,
            });
        } else {
            out.extend(tokens.into_iter().map(|token| Exploded { token, row: i }));
        }
    }
    out
}
