//! Matrix benchmarks
//!
//! Hot paths of a resumed invocation:
//! - Version detection over config values
//! - Matrix expansion
//! - Pruning against a large history
//! - Results file loading

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mpi_matrix::artifact::detect;
use mpi_matrix::config::{Config, ConfigLoader, KeyValue};
use mpi_matrix::experiment::{build_matrix, prune};
use mpi_matrix::results::{self, ResultRecord, ResultsStore, Status};

/// Config with `n` synthetic Open MPI releases
fn create_config(n: usize) -> Config {
    let entries = (0..n).map(|i| {
        KeyValue::new(
            format!("openmpi-{i}"),
            format!(
                "https://download.open-mpi.org/release/open-mpi/v{}.{}/openmpi-{}.{}.{}.tar.bz2",
                i / 100,
                i / 10 % 10,
                i / 100,
                i / 10 % 10,
                i % 10
            ),
        )
    });
    ConfigLoader::new().load(entries).unwrap()
}

/// History recording every other experiment of the matrix
fn create_history(config: &Config) -> Vec<ResultRecord> {
    build_matrix(config)
        .iter()
        .step_by(2)
        .map(|e| ResultRecord::new(e.host().version(), e.container().version(), Status::Pass, "ok"))
        .collect()
}

fn bench_detect(c: &mut Criterion) {
    let urls = [
        "https://download.open-mpi.org/release/open-mpi/v3.0/openmpi-3.0.4.tar.bz2",
        "http://www.mpich.org/static/downloads/3.3.2/mpich-3.3.2.tar.gz",
        "http://registrationcenter-download.intel.com/akdlm/irc_nas/tec/15838/l_mpi_2019.5.281.tar.gz",
        "https://example.com/not-an-mpi-release.zip",
    ];

    c.bench_function("detect", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(detect(black_box(url)));
            }
        });
    });
}

fn bench_build_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_matrix");

    for size in [4, 16, 64].iter() {
        let config = create_config(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(build_matrix(&config)));
        });
    }

    group.finish();
}

fn bench_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune");

    for size in [4, 16, 64].iter() {
        let config = create_config(*size);
        let matrix = build_matrix(&config);
        let history = create_history(&config);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(prune(&matrix, &history)));
        });
    }

    group.finish();
}

fn bench_load_results(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_results");
    let dir = tempfile::tempdir().unwrap();

    for size in [16, 64].iter() {
        let config = create_config(*size);
        let path = dir.path().join(format!("results-{size}.txt"));
        let mut store = ResultsStore::open(&path).unwrap();
        for record in create_history(&config) {
            store.append(&record).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(results::load(&path).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_detect,
    bench_build_matrix,
    bench_prune,
    bench_load_results
);
criterion_main!(benches);
