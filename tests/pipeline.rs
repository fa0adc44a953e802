//! End-to-end pipeline tests: files on disk → load → filter → aggregate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use catalens::data::aggregate;
use catalens::data::expand::MultiField;
use catalens::data::filter::{self, FilterSpec};
use catalens::{load_dataset, LoadError};

fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const CATALOG_CSV: &str = "\
show_id,title,type,country,listed_in,cast,director,description,release_year,date_added
s1,Alpha,Movie,\"Brazil, India\",\"Dramas, International Movies\",,,A detective story,2018,\"September 9, 2019\"
s2,Beta,TV Show,France,Comedies,,,A kitchen comedy,2021,\"January 15, 2022\"
s3,Gamma,Movie,India,Documentaries,,,A mountain documentary,2016,
s4,Delta,Movie,,,,,No metadata at all,not-a-year,someday
";

const RATINGS_CSV: &str = "\
title,score
alpha ,85
Beta,90
Gamma,100
Unknown Title,50
";

#[test]
fn end_to_end_load_join_filter_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
    let ratings_path = write_file(dir.path(), "ratings.csv", RATINGS_CSV);

    let catalog = load_dataset(&catalog_path, Some(&ratings_path)).unwrap();
    assert_eq!(catalog.len(), 4);

    // Unknown columns (show_id) are ignored; missing cells become empty or
    // missing, never errors.
    let delta = &catalog.rows[3];
    assert_eq!(delta.country, "");
    assert_eq!(delta.release_year, None);
    assert_eq!(delta.date_added, None);
    assert_eq!(delta.n_countries, 0);

    // Token counts match the raw fields.
    let alpha = &catalog.rows[0];
    assert_eq!(alpha.n_countries, 2);
    assert_eq!(alpha.n_genres, 2);
    assert_eq!(
        alpha.date_added,
        chrono::NaiveDate::from_ymd_opt(2019, 9, 9)
    );

    // Join was case-insensitive and the 0–100 scale collapsed to 0–10;
    // the unmatched rating was dropped silently.
    let scores: Vec<Option<f64>> = catalog.rows.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![Some(8.5), Some(9.0), Some(10.0), None]);

    // Country scenario: "Brazil, India" matches a selection of ["India"].
    let mut spec = FilterSpec::unconstrained(&catalog);
    spec.score = None;
    spec.countries = BTreeSet::from(["India".to_string()]);
    let subset = filter::apply(&catalog, &spec);
    assert_eq!(
        subset.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
        vec!["Alpha", "Gamma"]
    );

    // Same row, selection ["France"]: excluded.
    spec.countries = BTreeSet::from(["France".to_string()]);
    let subset = filter::apply(&catalog, &spec);
    assert_eq!(
        subset.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
        vec!["Beta"]
    );

    // Aggregation over the full working set.
    let k = aggregate::kpis(&catalog.rows);
    assert_eq!(k.titles, 4);
    assert_eq!(k.countries, 3); // Brazil, India, France
    let counts = aggregate::value_counts(&catalog.rows, MultiField::Country);
    assert_eq!(counts[0], ("India".to_string(), 2));
}

#[test]
fn missing_catalog_is_a_reported_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(&dir.path().join("absent.csv"), None).unwrap_err();
    assert!(matches!(err, LoadError::MissingSource(_)));
}

#[test]
fn missing_ratings_only_disables_scores() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
    let ratings_path = dir.path().join("absent-ratings.csv");

    let catalog = load_dataset(&catalog_path, Some(&ratings_path)).unwrap();
    assert_eq!(catalog.len(), 4);
    assert!(!catalog.has_scores());
    assert_eq!(catalog.default_score_range(), None);
}

#[test]
fn latin1_catalog_falls_back_from_utf8() {
    let dir = tempfile::tempdir().unwrap();
    // "Amélie" with a Latin-1 encoded é (0xE9), invalid as UTF-8.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"title,type,country,listed_in,release_year\nAm");
    bytes.push(0xE9);
    bytes.extend_from_slice(b"lie,Movie,France,Comedies,2001\n");
    let catalog_path = write_file(dir.path(), "catalog.csv", bytes);

    let catalog = load_dataset(&catalog_path, None).unwrap();
    assert_eq!(catalog.rows[0].title, "Amélie");
    assert_eq!(catalog.rows[0].release_year, Some(2001));
}

#[test]
fn json_catalog_loads_like_csv() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_file(
        dir.path(),
        "catalog.json",
        r#"[
            {"title": "Alpha", "type": "Movie", "country": "Brazil, India",
             "listed_in": "Dramas", "release_year": 2018, "date_added": "2019-09-09"},
            {"title": "Beta", "type": "TV Show", "country": null, "release_year": "bad"}
        ]"#,
    );

    let catalog = load_dataset(&catalog_path, None).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.rows[0].n_countries, 2);
    assert_eq!(
        catalog.rows[0].date_added,
        chrono::NaiveDate::from_ymd_opt(2019, 9, 9)
    );
    assert_eq!(catalog.rows[1].country, "");
    assert_eq!(catalog.rows[1].release_year, None);
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "catalog.parquet", b"not really parquet");
    let err = load_dataset(&path, None).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "parquet"));
}

#[test]
fn heuristic_score_detection_via_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = write_file(dir.path(), "catalog.csv", CATALOG_CSV);
    // No recognized column name; "votes" is out of range, "meta" fits 0–100.
    let ratings_path = write_file(
        dir.path(),
        "ratings.csv",
        "title,votes,meta\nAlpha,120000,82\nBeta,95000,64\n",
    );

    let catalog = load_dataset(&catalog_path, Some(&ratings_path)).unwrap();
    assert_eq!(catalog.rows[0].score, Some(8.2));
    assert_eq!(catalog.rows[1].score, Some(6.4));
    assert_eq!(catalog.rows[2].score, None);
}
