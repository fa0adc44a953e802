/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  catalog.csv / .json      ratings.csv (optional)
///        │                        │
///        ▼                        ▼
///   ┌──────────┐   join by   ┌──────────┐
///   │  loader   │◄───────────│ ratings  │  score detection + 0–10 scale
///   └──────────┘    title    └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Catalog   │  normalized rows + filter options (immutable)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec conjunction → working subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  KPIs, counts, histogram, cross-tab
///   └──────────┘
/// ```
///
/// `expand` holds the one tokenization rule for multi-valued columns and is
/// shared by the loader, the filter engine, and every aggregation.
pub mod aggregate;
pub mod expand;
pub mod filter;
pub mod loader;
pub mod model;
