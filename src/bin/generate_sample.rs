use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const OUTPUT_DIR: &str = "data";
const N_GAMES: usize = 400;

const DEVELOPERS: [&str; 12] = [
    "Valve",
    "Re-Logic",
    "CD PROJEKT RED",
    "FromSoftware",
    "Klei Entertainment",
    "ConcernedApe",
    "Facepunch Studios",
    "Bethesda Game Studios",
    "Ubisoft Montreal",
    "Paradox Development Studio",
    "Team Cherry",
    "Larian Studios",
];

const TAGS: [&str; 14] = [
    "Action", "RPG", "Indie", "Adventure", "Strategy", "Simulation", "Open World",
    "Multiplayer", "Survival", "Sandbox", "Shooter", "Puzzle", "Horror", "Casual",
];

const OS: [&str; 4] = ["Windows", "Windows, macOS", "Windows, Linux", "Windows, macOS, Linux"];

const AGES: [f64; 4] = [0.0, 13.0, 17.0, 18.0];

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `None` with the given probability.
    fn maybe<T>(&mut self, missing: f64, value: T) -> Option<T> {
        (self.next_f64() >= missing).then_some(value)
    }
}

/// One generated row, numbers kept as numbers for the Parquet file.
#[derive(Clone)]
struct SampleGame {
    game_name: String,
    developer: String,
    price: Option<f64>,
    reviews_like_rate: Option<f64>,
    rating: Option<f64>,
    estimated_downloads: Option<f64>,
    release_date: Option<String>,
    user_defined_tags: String,
    supported_os: String,
    age_restriction: Option<f64>,
    length: Option<f64>,
    difficulty: Option<f64>,
    all_reviews_number: Option<f64>,
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleGame> {
    let mut games: Vec<SampleGame> = (0..N_GAMES)
        .map(|i| {
            let free = rng.next_f64() < 0.2;
            let price = if free {
                0.0
            } else {
                (rng.range(2.0, 70.0) * 100.0).round() / 100.0 - 0.01
            };
            // Heavy tail: a few games dominate downloads.
            let downloads = (10f64.powf(rng.range(4.0, 7.5)) / 1000.0).round() * 1000.0;
            let like_rate = rng.range(55.0, 99.0).round();
            let n_tags = 1 + (rng.next_u64() % 4) as usize;
            let tags: Vec<&str> = (0..n_tags).map(|_| *rng.pick(&TAGS)).collect();
            let year = 2006 + (rng.next_u64() % 19) as i32;
            let month = 1 + rng.next_u64() % 12;
            let day = 1 + rng.next_u64() % 28;
            let developer = rng.pick(&DEVELOPERS).to_string();
            let supported_os = rng.pick(&OS).to_string();
            let age = *rng.pick(&AGES);
            let length = rng.range(2.0, 120.0).round();
            let difficulty = rng.range(1.0, 10.0).round();
            let reviews = (downloads * rng.range(0.01, 0.08)).round();

            SampleGame {
                game_name: format!("Game {:03}", i + 1),
                developer,
                price: rng.maybe(0.03, price),
                reviews_like_rate: rng.maybe(0.02, like_rate),
                rating: rng.maybe(0.05, (like_rate / 20.0 * 100.0).round() / 100.0),
                estimated_downloads: rng.maybe(0.03, downloads),
                release_date: rng.maybe(0.02, format!("{year}-{month:02}-{day:02}")),
                user_defined_tags: tags.join(", "),
                supported_os,
                age_restriction: rng.maybe(0.05, age),
                length: rng.maybe(0.1, length),
                difficulty: rng.maybe(0.1, difficulty),
                all_reviews_number: Some(reviews),
            }
        })
        .collect();

    // A couple of exact duplicates so the loader's cleaning has work to do.
    for i in [3, 42] {
        let duplicate = games[i].clone();
        games.push(duplicate);
    }
    games
}

fn num(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(path: &Path, games: &[SampleGame]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "game_name",
        "developer",
        "price",
        "reviews_like_rate",
        "rating",
        "estimated_downloads",
        "release_date",
        "user_defined_tags",
        "supported_os",
        "age_restriction",
        "length",
        "difficulty",
        "all_reviews_number",
    ])?;
    for g in games {
        writer.write_record([
            g.game_name.clone(),
            g.developer.clone(),
            num(g.price),
            num(g.reviews_like_rate),
            num(g.rating),
            num(g.estimated_downloads),
            g.release_date.clone().unwrap_or_default(),
            g.user_defined_tags.clone(),
            g.supported_os.clone(),
            num(g.age_restriction),
            num(g.length),
            num(g.difficulty),
            num(g.all_reviews_number),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, games: &[SampleGame]) -> Result<()> {
    let text = |f: fn(&SampleGame) -> Option<&str>| -> ArrayRef {
        Arc::new(games.iter().map(f).collect::<StringArray>())
    };
    let float = |f: fn(&SampleGame) -> Option<f64>| -> ArrayRef {
        Arc::new(games.iter().map(f).collect::<Float64Array>())
    };

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("game_name", text(|g| Some(g.game_name.as_str()))),
        ("developer", text(|g| Some(g.developer.as_str()))),
        ("price", float(|g| g.price)),
        ("reviews_like_rate", float(|g| g.reviews_like_rate)),
        ("rating", float(|g| g.rating)),
        ("estimated_downloads", float(|g| g.estimated_downloads)),
        ("release_date", text(|g| g.release_date.as_deref())),
        ("user_defined_tags", text(|g| Some(g.user_defined_tags.as_str()))),
        ("supported_os", text(|g| Some(g.supported_os.as_str()))),
        ("age_restriction", float(|g| g.age_restriction)),
        ("length", float(|g| g.length)),
        ("difficulty", float(|g| g.difficulty)),
        ("all_reviews_number", float(|g| g.all_reviews_number)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing Parquet batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let games = generate(&mut rng);

    let dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let csv_path = dir.join("bestSelling_games.csv");
    write_csv(&csv_path, &games)?;
    let parquet_path = dir.join("bestSelling_games.parquet");
    write_parquet(&parquet_path, &games)?;

    println!(
        "Wrote {} games to {} and {}",
        games.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
