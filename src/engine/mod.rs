//! Matrix execution and resume
//!
//! [`Pipeline`] wires the components together:
//!
//! ```text
//! Config ─> build_matrix ─> prune(history) ─> ExecutionLoop ─> ResultsStore::append
//! ```
//!
//! Experiments run strictly one after another, in matrix order, and every
//! decided outcome is synced to the results file before the next experiment
//! starts. Re-running the pipeline against the same results file only
//! attempts what is not on record yet.

mod aggregate;

pub use aggregate::{Aggregator, ExperimentState};

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, ConfigLoader, ErrorPolicy, HarnessSettings, RunCount};
use crate::experiment::{build_matrix, prune, Experiment};
use crate::results::{self, ResultRecord, ResultsStore, Status};
use crate::runner::ExperimentRunner;
use crate::{Error, Result};

/// Run all iterations of one experiment and fold them into a record.
///
/// Stops at the first infrastructure error.
pub fn run_experiment<R>(runner: &mut R, experiment: &Experiment, runs: RunCount) -> ResultRecord
where
    R: ExperimentRunner + ?Sized,
{
    let id = experiment.id();
    let mut aggregator = Aggregator::new(runs);
    while let Some(i) = aggregator.begin() {
        info!(
            "Running experiment {i}/{} with host MPI {} and container MPI {}",
            runs.get(),
            id.host,
            id.container
        );
        aggregator.observe(runner.run(experiment));
    }
    // begin() only returns None once decided
    aggregator
        .into_record(&id)
        .unwrap_or_else(|| ResultRecord::new(&id.host, &id.container, Status::Error, "undecided"))
}

/// Outcome counts of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Experiments in the full matrix
    pub matrix: usize,
    /// Experiments skipped because they are already on record
    pub skipped: usize,
    /// Experiments attempted in this invocation
    pub attempted: usize,
    /// Attempted experiments recorded as PASS
    pub passed: usize,
    /// Attempted experiments recorded as FAIL
    pub failed: usize,
    /// Attempted experiments recorded as ERROR
    pub errored: usize,
    /// Invocation start
    pub started_at: DateTime<Utc>,
    /// Invocation end
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn new(matrix: usize, skipped: usize) -> Self {
        let now = Utc::now();
        Self {
            matrix,
            skipped,
            attempted: 0,
            passed: 0,
            failed: 0,
            errored: 0,
            started_at: now,
            finished_at: now,
        }
    }

    fn count(&mut self, status: Status) {
        self.attempted += 1;
        match status {
            Status::Pass => self.passed += 1,
            Status::Fail => self.failed += 1,
            Status::Error => self.errored += 1,
        }
    }
}

/// Sequential executor for pending experiments.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLoop {
    runs: RunCount,
    policy: ErrorPolicy,
}

impl ExecutionLoop {
    /// Executor running each experiment `runs` times.
    #[must_use]
    pub const fn new(runs: RunCount, policy: ErrorPolicy) -> Self {
        Self { runs, policy }
    }

    /// Run every pending experiment, appending one record each.
    ///
    /// `report` is updated as records are appended, so the counts stay
    /// accurate even when this returns early.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if a record cannot be persisted, or [`Error::Aborted`]
    /// after the first ERROR under [`ErrorPolicy::Abort`].
    pub fn execute<R>(
        &self,
        pending: &[Experiment],
        runner: &mut R,
        store: &mut ResultsStore,
        report: &mut RunReport,
    ) -> Result<()>
    where
        R: ExperimentRunner + ?Sized,
    {
        for experiment in pending {
            let record = run_experiment(runner, experiment, self.runs);
            store.append(&record)?;
            report.count(record.status());

            match record.status() {
                Status::Pass => info!("Experiment succeeded"),
                Status::Fail => warn!(note = record.note(), "Experiment failed"),
                Status::Error => {
                    warn!(note = record.note(), "Cannot run experiment");
                    if self.policy == ErrorPolicy::Abort {
                        return Err(Error::Aborted {
                            host: record.host_version().to_string(),
                            container: record.container_version().to_string(),
                            reason: record.note().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// What a run would do, without running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Experiments in the full matrix
    pub matrix: usize,
    /// Records already in the results file
    pub history: usize,
    /// Experiments still to run, in execution order
    pub pending: Vec<Experiment>,
}

/// Config + settings: everything one invocation needs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    settings: HarnessSettings,
}

impl Pipeline {
    /// Create a pipeline from a loaded config.
    #[must_use]
    pub const fn new(config: Config, settings: HarnessSettings) -> Self {
        Self { config, settings }
    }

    /// Load the config file with the settings' duplicate policy.
    ///
    /// # Errors
    ///
    /// Any config loading error.
    pub fn from_config_file(path: impl AsRef<Path>, settings: HarnessSettings) -> Result<Self> {
        let config = ConfigLoader::new()
            .duplicate_policy(settings.duplicate_policy())
            .load_file(path)?;
        Ok(Self::new(config, settings))
    }

    /// Loaded config.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Settings.
    #[must_use]
    pub const fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Compute the pending experiments against the results file.
    ///
    /// # Errors
    ///
    /// Results file IO or parse errors.
    pub fn plan(&self) -> Result<Plan> {
        let matrix = build_matrix(&self.config);
        let history = results::load(self.settings.results_path())?;
        let pending = prune(&matrix, &history);
        Ok(Plan {
            matrix: matrix.len(),
            history: history.len(),
            pending,
        })
    }

    /// Run everything not yet on record.
    ///
    /// # Errors
    ///
    /// Results file errors, or [`Error::Aborted`] under the abort policy.
    pub fn run<R>(&self, runner: &mut R) -> Result<RunReport>
    where
        R: ExperimentRunner + ?Sized,
    {
        let plan = self.plan()?;
        let skipped = plan.matrix - plan.pending.len();
        let mut report = RunReport::new(plan.matrix, skipped);

        info!(
            implementation = %self.config.implementation(),
            results = %self.settings.results_path().display(),
            matrix = plan.matrix,
            skipped,
            pending = plan.pending.len(),
            runs = self.settings.run_count().get(),
            "starting experiment matrix"
        );

        if !plan.pending.is_empty() {
            let mut store = ResultsStore::open(self.settings.results_path())?;
            let executor =
                ExecutionLoop::new(self.settings.run_count(), self.settings.error_policy());
            let outcome = executor.execute(&plan.pending, runner, &mut store, &mut report);
            report.finished_at = Utc::now();
            outcome?;
        }

        info!(
            attempted = report.attempted,
            passed = report.passed,
            failed = report.failed,
            errored = report.errored,
            "experiment matrix done"
        );
        Ok(report)
    }
}
