//! Cleaning pipeline performance benchmarks.
//!
//! Measures ingestion and the full stage chain on synthetic layoff data with
//! duplicates, blank industries and unmeasured rows mixed in.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sift::{Ingestion, Pipeline, Stage};
use sift::pipeline::{Deduplicator, NullResolver};
use std::io::Write;
use tempfile::NamedTempFile;

const COMPANIES: &[&str] = &[
    "Airbnb", "Casper", "Carvana", "Juul", "Bally's Interactive", " Included Health", "Meta",
];
const INDUSTRIES: &[&str] = &["Travel", "Retail", "Crypto Currency", "CryptoCurrency", "Consumer", ""];
const COUNTRIES: &[&str] = &["United States", "United States.", "Canada", "India"];

/// Generate layoff CSV rows with a fixed seed.
fn generate_layoffs_data(rows: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = String::from(
        "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions\n",
    );

    let mut previous = String::new();
    for _ in 0..rows {
        // Roughly one row in ten repeats the previous line.
        if !previous.is_empty() && rng.gen_range(0..10) == 0 {
            data.push_str(&previous);
            continue;
        }

        let total = if rng.gen_range(0..4) == 0 {
            "NULL".to_string()
        } else {
            rng.gen_range(1..5000).to_string()
        };
        let percentage = if rng.gen_range(0..3) == 0 {
            "NULL".to_string()
        } else {
            format!("{:.2}", rng.gen_range(0.01..1.0))
        };

        let line = format!(
            "{},SF Bay Area,{},{},{},{}/{}/2022,Series B,{},{}\n",
            COMPANIES[rng.gen_range(0..COMPANIES.len())],
            INDUSTRIES[rng.gen_range(0..INDUSTRIES.len())],
            total,
            percentage,
            rng.gen_range(1..13),
            rng.gen_range(1..29),
            COUNTRIES[rng.gen_range(0..COUNTRIES.len())],
            rng.gen_range(0..2000),
        );
        data.push_str(&line);
        previous = line;
    }

    data
}

fn temp_file(data: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
    temp.write_all(data.as_bytes()).unwrap();
    temp
}

/// Benchmark ingestion plus all stages.
fn bench_clean_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_file");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_layoffs_data(*rows);
        let temp = temp_file(&data);
        let pipeline = Pipeline::new().unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &temp, |b, temp| {
            b.iter(|| black_box(pipeline.clean_file(temp.path()).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark individual stages on an ingested working copy.
fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    let data = generate_layoffs_data(10_000);
    let temp = temp_file(&data);
    let copy = Ingestion::new().ingest_file(temp.path()).unwrap();

    group.throughput(Throughput::Elements(copy.records.len() as u64));
    group.bench_function("deduplicate_10k", |b| {
        let stage = Deduplicator::new();
        b.iter(|| black_box(stage.apply(&copy.records).unwrap()))
    });
    group.bench_function("resolve_nulls_10k", |b| {
        let stage = NullResolver::default();
        b.iter(|| black_box(stage.apply(&copy.records).unwrap()))
    });
    group.bench_function("run_all_10k", |b| {
        let pipeline = Pipeline::new().unwrap();
        b.iter(|| black_box(pipeline.run(&copy.records).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_clean_file, bench_stages);
criterion_main!(benches);
