//! Writes a small synthetic dataset (`data/catalog.csv`, `data/ratings.csv`)
//! for trying the pipeline without a real export.

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const COUNTRIES: &[&str] = &[
    "United States",
    "India",
    "Brazil",
    "United Kingdom",
    "France",
    "Japan",
    "South Korea",
    "Spain",
];

const GENRES: &[&str] = &[
    "Dramas",
    "Comedies",
    "Documentaries",
    "Action & Adventure",
    "Kids' TV",
    "Thrillers",
    "Romantic Movies",
];

const DESCRIPTION_BITS: &[&str] = &[
    "a detective untangles a web of secrets in a small town",
    "an unlikely crew plans the heist of the century",
    "a family rebuilds after losing everything",
    "rival chefs compete for a legendary kitchen",
    "a young athlete chases an impossible dream",
    "old friends reunite for one last road trip",
];

fn main() {
    let mut rng = SimpleRng::new(42);

    std::fs::create_dir_all("data").expect("failed to create data directory");

    // ---- catalog.csv ----
    let mut writer = csv::Writer::from_path("data/catalog.csv").expect("failed to create catalog");
    writer
        .write_record([
            "title",
            "type",
            "country",
            "listed_in",
            "cast",
            "director",
            "description",
            "release_year",
            "date_added",
        ])
        .expect("failed to write header");

    let n_titles = 200;
    let mut titles = Vec::with_capacity(n_titles);
    for i in 0..n_titles {
        let title = format!("Sample Title {i:03}");
        let kind = if rng.next_f64() < 0.6 { "Movie" } else { "TV Show" };

        // Roughly a third of rows are multi-country, mirroring real catalogs.
        let country = if rng.next_f64() < 0.1 {
            String::new()
        } else if rng.next_f64() < 0.35 {
            format!("{}, {}", rng.pick(COUNTRIES), rng.pick(COUNTRIES))
        } else {
            rng.pick(COUNTRIES).to_string()
        };

        let listed_in = if rng.next_f64() < 0.5 {
            format!("{}, {}", rng.pick(GENRES), rng.pick(GENRES))
        } else {
            rng.pick(GENRES).to_string()
        };

        let year = (1980 + (rng.next_u64() % 45) as i32).to_string();
        let date_added = format!("2021-{:02}-{:02}", 1 + rng.next_u64() % 12, 1 + rng.next_u64() % 28);

        writer
            .write_record([
                title.as_str(),
                kind,
                country.as_str(),
                listed_in.as_str(),
                "",
                "",
                *rng.pick(DESCRIPTION_BITS),
                year.as_str(),
                date_added.as_str(),
            ])
            .expect("failed to write catalog row");
        titles.push(title);
    }
    writer.flush().expect("failed to flush catalog");

    // ---- ratings.csv ----
    // Scores on a 0–100 scale to exercise the loader's scale normalization;
    // only ~70% of titles are rated so some rows stay score-less.
    let mut writer = csv::Writer::from_path("data/ratings.csv").expect("failed to create ratings");
    writer
        .write_record(["title", "votes", "critic_score"])
        .expect("failed to write header");

    let mut rated = 0;
    for title in &titles {
        if rng.next_f64() < 0.3 {
            continue;
        }
        let score = format!("{:.0}", 35.0 + rng.next_f64() * 63.0);
        let votes = (1_000 + rng.next_u64() % 200_000).to_string();
        writer
            .write_record([title.as_str(), votes.as_str(), score.as_str()])
            .expect("failed to write rating row");
        rated += 1;
    }
    writer.flush().expect("failed to flush ratings");

    println!("wrote {n_titles} catalog rows and {rated} ratings under data/");
}
