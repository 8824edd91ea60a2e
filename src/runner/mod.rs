//! Boundary to the container build/launch backend
//!
//! The harness never builds images or launches ranks itself. It hands each
//! [`Experiment`] to an [`ExperimentRunner`] and only interprets the verdict:
//!
//! - `Ok(RunOutcome { passed: true, .. })`: the benchmark ran and passed
//! - `Ok(RunOutcome { passed: false, .. })`: the benchmark ran and failed
//! - `Err(_)`: the experiment could not be run at all (infrastructure)

mod command;

pub use command::CommandRunner;

use crate::experiment::Experiment;

/// Verdict of one iteration that actually ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Benchmark judged successful
    pub passed: bool,
    /// Diagnostic text
    pub note: String,
}

impl RunOutcome {
    /// Passing outcome.
    #[must_use]
    pub fn pass(note: impl Into<String>) -> Self {
        Self {
            passed: true,
            note: note.into(),
        }
    }

    /// Failing outcome.
    #[must_use]
    pub fn fail(note: impl Into<String>) -> Self {
        Self {
            passed: false,
            note: note.into(),
        }
    }
}

/// Runs one iteration of an experiment. Blocking; may take hours.
pub trait ExperimentRunner {
    /// Build, launch, wait, tear down.
    ///
    /// # Errors
    ///
    /// Any error means the iteration could not be carried out; it is recorded
    /// as an ERROR result, not as a benchmark failure.
    fn run(&mut self, experiment: &Experiment) -> anyhow::Result<RunOutcome>;
}

impl<F> ExperimentRunner for F
where
    F: FnMut(&Experiment) -> anyhow::Result<RunOutcome>,
{
    fn run(&mut self, experiment: &Experiment) -> anyhow::Result<RunOutcome> {
        self(experiment)
    }
}
