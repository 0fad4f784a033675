use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Genre → (mean global sales in millions, NA / EU / JP / Other share).
const GENRES: [(&str, f64, [f64; 4]); 12] = [
    ("Action", 0.55, [0.48, 0.30, 0.10, 0.12]),
    ("Adventure", 0.20, [0.40, 0.26, 0.26, 0.08]),
    ("Fighting", 0.50, [0.45, 0.20, 0.28, 0.07]),
    ("Misc", 0.45, [0.50, 0.27, 0.14, 0.09]),
    ("Platform", 0.90, [0.50, 0.23, 0.20, 0.07]),
    ("Puzzle", 0.40, [0.42, 0.20, 0.32, 0.06]),
    ("Racing", 0.60, [0.45, 0.33, 0.09, 0.13]),
    ("Role-Playing", 0.65, [0.35, 0.20, 0.40, 0.05]),
    ("Shooter", 0.80, [0.55, 0.30, 0.03, 0.12]),
    ("Simulation", 0.45, [0.44, 0.29, 0.20, 0.07]),
    ("Sports", 0.55, [0.50, 0.28, 0.10, 0.12]),
    ("Strategy", 0.25, [0.37, 0.28, 0.30, 0.05]),
];

const PLATFORMS: [(&str, i32, i32); 8] = [
    ("NES", 1983, 1994),
    ("SNES", 1990, 1999),
    ("PS", 1994, 2003),
    ("N64", 1996, 2002),
    ("PS2", 2000, 2011),
    ("DS", 2004, 2013),
    ("Wii", 2006, 2015),
    ("PS4", 2013, 2020),
];

const PUBLISHERS: [&str; 6] = [
    "Nintendo",
    "Electronic Arts",
    "Activision",
    "Sony Computer Entertainment",
    "Ubisoft",
    "Take-Two Interactive",
];

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One output row, serialized with the column names the dashboard reads.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "Rank")]
    rank: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Platform")]
    platform: String,
    #[serde(rename = "Year")]
    year: Option<i64>,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "Publisher")]
    publisher: String,
    #[serde(rename = "NA_Sales")]
    na_sales: f64,
    #[serde(rename = "EU_Sales")]
    eu_sales: f64,
    #[serde(rename = "JP_Sales")]
    jp_sales: f64,
    #[serde(rename = "Other_Sales")]
    other_sales: f64,
    #[serde(rename = "Global_Sales")]
    global_sales: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate_rows(rng: &mut SimpleRng, count: usize) -> Vec<Row> {
    let mut rows: Vec<Row> = (0..count)
        .map(|i| {
            let (genre, mean, shares) = GENRES[rng.below(GENRES.len())];
            let (platform, first, last) = PLATFORMS[rng.below(PLATFORMS.len())];
            let publisher = PUBLISHERS[rng.below(PUBLISHERS.len())];

            // Roughly 2% of releases have an unknown year.
            let year = if rng.next_f64() < 0.02 {
                None
            } else {
                Some((first + rng.below((last - first + 1) as usize) as i32) as i64)
            };

            // Log-normal sales: many small titles, a few blockbusters.
            let global = (mean.ln() + rng.gauss(0.0, 1.1)).exp().min(80.0);
            let regional: Vec<f64> = shares
                .iter()
                .map(|&share| round2(global * (share + rng.gauss(0.0, 0.03)).max(0.0)))
                .collect();
            let global_sales = round2(regional.iter().sum());

            Row {
                rank: 0,
                name: format!("{genre} {platform} #{i}"),
                platform: platform.to_string(),
                year,
                genre: genre.to_string(),
                publisher: publisher.to_string(),
                na_sales: regional[0],
                eu_sales: regional[1],
                jp_sales: regional[2],
                other_sales: regional[3],
                global_sales,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.global_sales.total_cmp(&a.global_sales));
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as i64 + 1;
    }
    rows
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let text = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());
    let number = |f: fn(&Row) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("Rank", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Platform", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, true),
        Field::new("Genre", DataType::Utf8, false),
        Field::new("Publisher", DataType::Utf8, false),
        Field::new("NA_Sales", DataType::Float64, false),
        Field::new("EU_Sales", DataType::Float64, false),
        Field::new("JP_Sales", DataType::Float64, false),
        Field::new("Other_Sales", DataType::Float64, false),
        Field::new("Global_Sales", DataType::Float64, false),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.rank).collect::<Vec<_>>())),
            Arc::new(text(|r| r.name.as_str())),
            Arc::new(text(|r| r.platform.as_str())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(text(|r| r.genre.as_str())),
            Arc::new(text(|r| r.publisher.as_str())),
            Arc::new(number(|r| r.na_sales)),
            Arc::new(number(|r| r.eu_sales)),
            Arc::new(number(|r| r.jp_sales)),
            Arc::new(number(|r| r.other_sales)),
            Arc::new(number(|r| r.global_sales)),
        ],
    )
    .context("building record batch")
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 5000);

    // Write CSV
    let csv_path = out_dir.join("vgsales_cleaned.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;

    // Write Parquet
    let batch = to_batch(&rows)?;
    let parquet_path = out_dir.join("vgsales_cleaned.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5.min(batch.num_rows()))])?);
    println!(
        "Wrote {} records to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
