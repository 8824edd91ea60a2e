//! Resume Walkthrough Example
//!
//! Demonstrates an interrupted matrix run picking up where it left off,
//! using a simulated runner instead of real container builds.
//!
//! Run with: cargo run --example resume_walkthrough

use mpi_matrix::config::{ConfigLoader, HarnessSettings, KeyValue, RunCount};
use mpi_matrix::engine::{run_experiment, Pipeline};
use mpi_matrix::experiment::Experiment;
use mpi_matrix::results::{self, ResultsStore, Summary};
use mpi_matrix::runner::RunOutcome;

fn main() -> anyhow::Result<()> {
    println!("=== mpi-matrix Resume Walkthrough ===\n");

    let dir = std::env::temp_dir().join(format!("mpi-matrix-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let results_path = dir.join("openmpi-results.txt");

    // -------------------------------------------------------------------------
    // 1. Load a configuration
    // -------------------------------------------------------------------------
    println!("1. Loading configuration...");

    let config = ConfigLoader::new().load(vec![
        KeyValue::new(
            "openmpi-3.0.4",
            "https://download.open-mpi.org/release/open-mpi/v3.0/openmpi-3.0.4.tar.bz2",
        ),
        KeyValue::new(
            "openmpi-3.1.0",
            "https://download.open-mpi.org/release/open-mpi/v3.1/openmpi-3.1.0.tar.bz2",
        ),
        KeyValue::new(
            "openmpi-4.0.2",
            "https://download.open-mpi.org/release/open-mpi/v4.0/openmpi-4.0.2.tar.bz2",
        ),
    ])?;

    println!("   Implementation: {}", config.implementation());
    for (version, artifact) in config.versions() {
        println!("   {version}: {}", artifact.location());
    }

    let settings = HarnessSettings::builder(&results_path)
        .run_count(RunCount::new(2)?)
        .build();
    let pipeline = Pipeline::new(config, settings);

    // -------------------------------------------------------------------------
    // 2. First invocation, interrupted after four experiments
    // -------------------------------------------------------------------------
    println!("\n2. First invocation (interrupted)...");

    // Simulate a kill: only the first four experiments get recorded.
    let mut runner = |experiment: &Experiment| -> anyhow::Result<RunOutcome> { Ok(simulate(experiment)) };
    let mut store = ResultsStore::open(&results_path)?;
    for experiment in pipeline.plan()?.pending.iter().take(4) {
        let record = run_experiment(&mut runner, experiment, pipeline.settings().run_count());
        store.append(&record)?;
        println!("   {} -> {}", experiment.id(), record.status());
    }
    drop(store);

    // -------------------------------------------------------------------------
    // 3. Second invocation resumes
    // -------------------------------------------------------------------------
    println!("\n3. Second invocation...");

    let plan = pipeline.plan()?;
    println!("   {} of {} experiments pending", plan.pending.len(), plan.matrix);

    let report = pipeline.run(&mut runner)?;
    println!(
        "   attempted {}, skipped {} ({} pass, {} fail)",
        report.attempted, report.skipped, report.passed, report.failed
    );

    // -------------------------------------------------------------------------
    // 4. Summary
    // -------------------------------------------------------------------------
    println!("\n4. Compatibility table:\n");

    let summary = Summary::from_records(&results::load(&results_path)?);
    print!("{}", summary.render_table());

    std::fs::remove_dir_all(&dir).ok();
    println!("\n=== Resume Walkthrough Complete ===");
    Ok(())
}

/// Pretend containers built against an older major release fail on a newer host.
fn simulate(experiment: &Experiment) -> RunOutcome {
    let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
    if major(experiment.host().version()) > major(experiment.container().version()) {
        RunOutcome::fail("ABI mismatch in MPI_Init")
    } else {
        RunOutcome::pass("2 ranks, 0 errors")
    }
}
