use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::data::filter::{apply, FilterSpec};
use crate::data::loader::{self, LoadError};
use crate::data::model::{Catalog, CatalogRow};

// ---------------------------------------------------------------------------
// Content fingerprint
// ---------------------------------------------------------------------------

/// Cache key for one loaded dataset: a CRC32 of each source file's bytes
/// plus its length. Two loads of identical content share one normalized
/// catalog; a changed file simply produces a new key, so the cache needs no
/// invalidation signalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    catalog: (u32, u64),
    ratings: Option<(u32, u64)>,
}

fn file_digest(path: &Path) -> std::io::Result<(u32, u64)> {
    let bytes = std::fs::read(path)?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&bytes);
    Ok((hasher.finalize(), bytes.len() as u64))
}

impl Fingerprint {
    /// Fingerprint the dataset sources. A missing ratings file hashes as
    /// absent rather than failing; a missing catalog file is an error.
    pub fn of(catalog_path: &Path, ratings_path: Option<&Path>) -> std::io::Result<Self> {
        let ratings = match ratings_path {
            Some(path) => match file_digest(path) {
                Ok(digest) => Some(digest),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => return Err(err),
            },
            None => None,
        };
        Ok(Fingerprint {
            catalog: file_digest(catalog_path)?,
            ratings,
        })
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One analytics session: the loaded catalog, the active filter selection,
/// the cached working subset, and a status line for the presentation layer.
///
/// The catalog is immutable once loaded; every filter change rebuilds the
/// working subset from scratch (recomputation is cheap). Loading goes
/// through a memo table keyed on [`Fingerprint`], so a given source content
/// is parsed at most once per session.
pub struct Session {
    cache: HashMap<Fingerprint, Arc<Catalog>>,

    /// Loaded catalog (None until a successful load).
    pub catalog: Option<Arc<Catalog>>,

    /// Active filter selection.
    pub spec: FilterSpec,

    /// Rows passing the current filters (cached working subset).
    pub working: Vec<CatalogRow>,

    /// Human-readable status for the presentation layer: load errors and
    /// the informational empty-result state land here, never as panics.
    pub status: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            cache: HashMap::new(),
            catalog: None,
            spec: FilterSpec {
                countries: Default::default(),
                genres: Default::default(),
                years: crate::data::model::DEFAULT_YEAR_RANGE,
                score: None,
            },
            working: Vec::new(),
            status: None,
        }
    }

    /// Load (or re-use from cache) the dataset at the given paths and reset
    /// the selection to the widest filter. On failure the session degrades
    /// to an empty catalog plus a status message.
    pub fn load(&mut self, catalog_path: &Path, ratings_path: Option<&Path>) {
        let key = match Fingerprint::of(catalog_path, ratings_path) {
            Ok(key) => key,
            Err(err) => {
                let missing = err.kind() == std::io::ErrorKind::NotFound;
                let err = if missing {
                    LoadError::MissingSource(catalog_path.to_path_buf())
                } else {
                    LoadError::Io {
                        path: catalog_path.to_path_buf(),
                        source: err,
                    }
                };
                self.fail(err);
                return;
            }
        };

        let catalog = if let Some(cached) = self.cache.get(&key) {
            log::debug!("cache hit for {}", catalog_path.display());
            Arc::clone(cached)
        } else {
            match loader::load_dataset(catalog_path, ratings_path) {
                Ok(catalog) => {
                    let catalog = Arc::new(catalog);
                    self.cache.insert(key, Arc::clone(&catalog));
                    catalog
                }
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        };

        self.set_catalog(catalog);
    }

    /// Ingest a loaded catalog and reset the selection to the widest filter.
    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        self.spec = FilterSpec::unconstrained(&catalog);
        self.catalog = Some(catalog);
        self.refilter();
    }

    fn fail(&mut self, err: LoadError) {
        log::error!("failed to load dataset: {err}");
        self.catalog = None;
        self.working.clear();
        self.status = Some(err.to_string());
    }

    /// Replace the active selection and rebuild the working subset.
    pub fn set_spec(&mut self, spec: FilterSpec) {
        self.spec = spec;
        self.refilter();
    }

    /// Recompute the working subset after a filter change.
    pub fn refilter(&mut self) {
        let Some(catalog) = &self.catalog else {
            self.working.clear();
            return;
        };
        self.working = apply(catalog, &self.spec);
        self.status = if self.working.is_empty() && !catalog.is_empty() {
            Some("no titles match the current filters".to_string())
        } else {
            None
        };
    }

    /// Whether the last load or refilter left anything to aggregate.
    pub fn has_rows(&self) -> bool {
        !self.working.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const CATALOG_CSV: &str = "\
title,type,country,listed_in,release_year,date_added
Alpha,Movie,\"Brazil, India\",Dramas,2018,\"September 9, 2019\"
Beta,TV Show,France,\"Comedies, Dramas\",2021,
Gamma,Movie,India,Documentaries,2016,
";

    #[test]
    fn missing_catalog_degrades_to_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.load(&dir.path().join("absent.csv"), None);
        assert!(session.catalog.is_none());
        assert!(session.working.is_empty());
        let status = session.status.as_deref().unwrap();
        assert!(status.contains("not found"), "unexpected status: {status}");
    }

    #[test]
    fn load_resets_to_widest_selection() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
        let mut session = Session::new();
        session.load(&catalog, None);

        assert_eq!(session.working.len(), 3);
        assert_eq!(session.spec.years, (2016, 2021));
        assert_eq!(session.spec.score, None);
        assert!(session.status.is_none());
    }

    #[test]
    fn identical_content_is_parsed_once() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
        let mut session = Session::new();

        session.load(&catalog, None);
        let first = Arc::clone(session.catalog.as_ref().unwrap());
        session.load(&catalog, None);
        let second = session.catalog.as_ref().unwrap();
        assert!(Arc::ptr_eq(&first, second));

        // Changed content produces a fresh key and a fresh parse.
        let catalog = write_file(
            dir.path(),
            "catalog.csv",
            "title,type,country,listed_in,release_year,date_added\nDelta,Movie,,,2020,\n",
        );
        session.load(&catalog, None);
        let third = session.catalog.as_ref().unwrap();
        assert!(!Arc::ptr_eq(&first, third));
        assert_eq!(third.len(), 1);
    }

    #[test]
    fn empty_filter_result_is_informational() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
        let mut session = Session::new();
        session.load(&catalog, None);

        let mut spec = session.spec.clone();
        spec.countries = BTreeSet::from(["Atlantis".to_string()]);
        session.set_spec(spec);

        assert!(!session.has_rows());
        assert_eq!(
            session.status.as_deref(),
            Some("no titles match the current filters")
        );

        // Widening again clears the state.
        let catalog_ref = Arc::clone(session.catalog.as_ref().unwrap());
        session.set_spec(FilterSpec::unconstrained(&catalog_ref));
        assert!(session.has_rows());
        assert!(session.status.is_none());
    }
}
