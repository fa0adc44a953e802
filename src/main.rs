use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use catalens::data::aggregate;
use catalens::data::expand::MultiField;
use catalens::Session;

const CATALOG_FILENAME: &str = "catalog.csv";
const RATINGS_FILENAME: &str = "ratings.csv";

/// Text stand-in for the rendering collaborator: load a data directory,
/// apply the widest filter, and print the dashboard summary.
fn main() -> Result<()> {
    env_logger::init();

    let data_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "data".to_string()));
    let catalog_path = data_dir.join(CATALOG_FILENAME);
    let ratings_path = data_dir.join(RATINGS_FILENAME);

    let mut session = Session::new();
    session.load(&catalog_path, Some(ratings_path.as_path()));

    if let Some(status) = &session.status {
        bail!("{status}");
    }

    print_summary(&session, &catalog_path);
    Ok(())
}

fn print_summary(session: &Session, catalog_path: &Path) {
    let rows = &session.working;
    let k = aggregate::kpis(rows);

    println!("catalog: {}", catalog_path.display());
    println!(
        "titles: {}   countries: {}   genres: {}",
        k.titles, k.countries, k.genres
    );
    let (y0, y1) = session.spec.years;
    println!("release years: {y0}–{y1}");

    print_counts("top countries", aggregate::value_counts(rows, MultiField::Country));
    print_counts("top genres", aggregate::value_counts(rows, MultiField::Genre));

    let per_year = aggregate::titles_per_year(rows);
    if let (Some((first, _)), Some((last, _))) =
        (per_year.iter().next(), per_year.iter().next_back())
    {
        println!("\nreleases per year ({first}..{last}):");
        for (year, count) in &per_year {
            println!("  {year}: {count}");
        }
    }

    if let Some(mean) = aggregate::mean_score(rows) {
        println!("\nmean score: {mean:.1}");
        println!("top rated:");
        for row in aggregate::top_rated(rows, 10) {
            if let Some(score) = row.score {
                println!("  {score:>4.1}  {}", row.title);
            }
        }
    } else {
        println!("\nno ratings source, score analytics disabled");
    }

    let terms = aggregate::term_counts(rows, 10);
    if !terms.is_empty() {
        let words: Vec<&str> = terms.iter().map(|(w, _)| w.as_str()).collect();
        println!("\ndominant description terms: {}", words.join(", "));
    }
}

fn print_counts(label: &str, counts: Vec<(String, usize)>) {
    println!("\n{label}:");
    for (token, count) in counts.iter().take(10) {
        println!("  {count:>5}  {token}");
    }
}
