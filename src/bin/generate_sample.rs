//! Writes a deterministic synthetic iguana monitoring dataset as CSV and
//! Parquet.
//!
//! ```text
//! cargo run --bin generate_sample -- [output-dir]   # default: data/
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const INDIVIDUALS: usize = 240;
const SURVEY_DAYS: i64 = 60;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleRow {
    id: String,
    age: &'static str,
    sex: &'static str,
    weight: Option<f64>,
    date: String,
}

fn generate(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap_or_default();

    (0..INDIVIDUALS)
        .map(|i| {
            let age = match rng.next_f64() {
                p if p < 0.5 => "Adulto",
                p if p < 0.8 => "Subadulto",
                _ => "Juvenil",
            };
            let sex = if rng.next_f64() < 0.55 { "Macho" } else { "Hembra" };

            let (mean, sd) = match (age, sex) {
                ("Adulto", "Macho") => (2.8, 0.6),
                ("Adulto", _) => (2.2, 0.5),
                ("Subadulto", _) => (1.3, 0.3),
                _ => (0.35, 0.1),
            };
            // A few weighings were never recorded.
            let weight = (rng.next_f64() >= 0.03)
                .then(|| (rng.gauss(mean, sd).max(0.05) * 100.0).round() / 100.0);

            let day = start + Duration::days(rng.below(SURVEY_DAYS as u64) as i64);
            let date = match rng.below(100) {
                0 => "sin fecha".to_string(),
                1 => "32/13/2024".to_string(),
                2 => String::new(),
                3..=12 => day.format("%d-%m-%Y").to_string(),
                13..=17 => day.format("%Y-%m-%d 00:00:00").to_string(),
                _ => day.format("%d/%m/%Y").to_string(),
            };

            SampleRow {
                id: format!("IG-{:04}", i + 1),
                age,
                sex,
                weight,
                date,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Individuos", "Edad", "Sexo", "Peso_Kg", "Fecha_entrga_CAV"])?;
    for row in rows {
        let weight = row.weight.map(|w| format!("{w:.2}")).unwrap_or_default();
        writer.write_record([
            row.id.as_str(),
            row.age,
            row.sex,
            weight.as_str(),
            row.date.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[SampleRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Individuos", DataType::Utf8, false),
        Field::new("Edad", DataType::Utf8, false),
        Field::new("Sexo", DataType::Utf8, false),
        Field::new("Peso_Kg", DataType::Float64, true),
        Field::new("Fecha_entrga_CAV", DataType::Utf8, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.id.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.age))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.sex))),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.weight).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| (!r.date.is_empty()).then_some(r.date.as_str()))
                .collect::<Vec<_>>(),
        )),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = out_dir.join("especies.csv");
    write_csv(&csv_path, &rows)?;

    let batch = to_batch(&rows)?;
    let parquet_path = out_dir.join("especies.parquet");
    write_parquet(&parquet_path, &batch)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} individuals to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
