//! Normalization, filtering and aggregation pipeline for catalog analytics
//! dashboards.
//!
//! The crate turns a row-oriented content catalog (plus an optional ratings
//! table) into an immutable normalized [`Catalog`], applies a
//! [`FilterSpec`] conjunction to produce a working subset, and summarizes
//! that subset for an external rendering layer. See [`data`] for the
//! pipeline stages and [`session::Session`] for the memoized load cache.

pub mod data;
pub mod session;

pub use data::filter::FilterSpec;
pub use data::loader::{load_dataset, LoadError};
pub use data::model::{Catalog, CatalogRow, ContentKind, RatingRow};
pub use session::Session;
