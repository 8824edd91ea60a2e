use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use mpi_matrix::config::{
    Config, ConfigLoader, DuplicatePolicy, ErrorPolicy, HarnessSettings, RunCount,
};
use mpi_matrix::engine::Pipeline;
use mpi_matrix::results::{self, Summary};
use mpi_matrix::runner::CommandRunner;

#[derive(Parser)]
#[command(
    name = "mpi-matrix",
    version,
    about = "Resumable host x container MPI compatibility matrix"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides); `run` also writes <implementation>.log
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every experiment not yet recorded in the results file
    Run {
        /// Key/value file listing the download location of each version
        #[arg(long)]
        config: PathBuf,
        /// Results file (default: <implementation>-results.txt)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Iterations per experiment
        #[arg(short = 'n', long = "runs", default_value_t = 1, allow_negative_numbers = true)]
        runs: i64,
        /// Stop the whole batch on the first infrastructure error
        #[arg(long)]
        abort_on_error: bool,
        /// Reject configs that list the same version twice
        #[arg(long)]
        strict_versions: bool,
        /// Benchmark command, with {host_version}/{container_version}/... placeholders
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Show the experiments a run would attempt
    Plan {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        strict_versions: bool,
        #[arg(long)]
        json: bool,
    },
    /// Summarize a results file
    Summary {
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

/// Plain-text copy of the log stream.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer().with_ansi(false).with_writer(Mutex::new(file))
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let file = log_file
        .map(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file.map(file_layer))
        .init();
    Ok(())
}

fn duplicate_policy(strict: bool) -> DuplicatePolicy {
    if strict {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::LastWriteWins
    }
}

fn load_config(path: &Path, strict_versions: bool) -> Result<Config> {
    ConfigLoader::new()
        .duplicate_policy(duplicate_policy(strict_versions))
        .load_file(path)
        .with_context(|| format!("cannot parse {}", path.display()))
}

fn results_path(output: Option<PathBuf>, config: &Config) -> PathBuf {
    output.unwrap_or_else(|| HarnessSettings::default_results_path(config.implementation()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            runs,
            abort_on_error,
            strict_versions,
            command,
        } => {
            let run_count = RunCount::new(runs)?;
            let loaded = load_config(&config, strict_versions)?;
            let log_file = cli
                .verbose
                .then(|| HarnessSettings::default_log_path(loaded.implementation()));
            init_tracing(cli.verbose, log_file.as_deref())?;
            let settings = HarnessSettings::builder(results_path(output, &loaded))
                .run_count(run_count)
                .error_policy(if abort_on_error {
                    ErrorPolicy::Abort
                } else {
                    ErrorPolicy::Continue
                })
                .duplicate_policy(duplicate_policy(strict_versions))
                .build();
            let results_file = settings.results_path().display().to_string();

            let mut args = command.into_iter();
            let program = args.next().context("missing benchmark command")?;
            let mut runner = CommandRunner::new(program, args.collect());

            let report = Pipeline::new(loaded, settings)
                .run(&mut runner)
                .with_context(|| format!("experiment run against {results_file} failed"))?;
            println!(
                "{} experiments: {} skipped, {} attempted ({} pass, {} fail, {} error)",
                report.matrix,
                report.skipped,
                report.attempted,
                report.passed,
                report.failed,
                report.errored
            );
        }
        Commands::Plan {
            config,
            output,
            strict_versions,
            json,
        } => {
            init_tracing(cli.verbose, None)?;
            let loaded = load_config(&config, strict_versions)?;
            let settings = HarnessSettings::builder(results_path(output, &loaded))
                .duplicate_policy(duplicate_policy(strict_versions))
                .build();
            let pipeline = Pipeline::new(loaded, settings);
            let plan = pipeline.plan().with_context(|| {
                format!(
                    "failed to parse output file {}",
                    pipeline.settings().results_path().display()
                )
            })?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "{} experiments, {} on record, {} pending",
                    plan.matrix,
                    plan.history,
                    plan.pending.len()
                );
                for experiment in &plan.pending {
                    println!("  {}", experiment.id());
                }
            }
        }
        Commands::Summary { output, json } => {
            init_tracing(cli.verbose, None)?;
            let history = results::load(&output)
                .with_context(|| format!("failed to parse output file {}", output.display()))?;
            let summary = Summary::from_records(&history);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary.render_table());
                println!(
                    "{} experiments: {} pass, {} fail, {} error",
                    summary.total(),
                    summary.passed,
                    summary.failed,
                    summary.errored
                );
            }
        }
    }

    Ok(())
}
