//! Per-experiment state machine
//!
//! ```text
//! Pending ──> Running(1) ──> ... ──> Running(N) ──> Decided(PASS|FAIL)
//!                 │                      │
//!                 └──── runner error ────┴────────> Decided(ERROR)
//! ```

use crate::config::RunCount;
use crate::experiment::ExperimentId;
use crate::results::{ResultRecord, Status};
use crate::runner::RunOutcome;

/// Lifecycle of one experiment inside the execution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    /// No iteration started yet.
    Pending,
    /// Iteration `i` (1-based) is in progress.
    Running(u32),
    /// Verdict reached; no further iterations.
    Decided(Status),
}

/// Folds N iteration outcomes into one verdict.
///
/// An infrastructure error decides ERROR immediately, so later iterations are
/// never started. Otherwise the verdict is PASS only if every iteration
/// passed. The note is taken from the last observed iteration.
#[derive(Debug, Clone)]
pub struct Aggregator {
    runs: u32,
    state: ExperimentState,
    all_passed: bool,
    note: String,
}

impl Aggregator {
    /// Aggregator for `runs` iterations, in `Pending` state.
    #[must_use]
    pub const fn new(runs: RunCount) -> Self {
        Self {
            runs: runs.get(),
            state: ExperimentState::Pending,
            all_passed: true,
            note: String::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ExperimentState {
        self.state
    }

    /// Iteration to run next, or `None` once decided.
    pub fn begin(&mut self) -> Option<u32> {
        match self.state {
            ExperimentState::Pending => {
                self.state = ExperimentState::Running(1);
                Some(1)
            }
            ExperimentState::Running(i) => Some(i),
            ExperimentState::Decided(_) => None,
        }
    }

    /// Record the outcome of the current iteration.
    ///
    /// Ignored once decided.
    pub fn observe(&mut self, outcome: anyhow::Result<RunOutcome>) {
        let Some(i) = self.begin() else {
            return;
        };
        match outcome {
            Err(err) => {
                self.note = format!("{err:#}");
                self.state = ExperimentState::Decided(Status::Error);
            }
            Ok(outcome) => {
                self.all_passed &= outcome.passed;
                self.note = outcome.note;
                self.state = if i >= self.runs {
                    ExperimentState::Decided(if self.all_passed {
                        Status::Pass
                    } else {
                        Status::Fail
                    })
                } else {
                    ExperimentState::Running(i + 1)
                };
            }
        }
    }

    /// Verdict, once decided.
    #[must_use]
    pub const fn decision(&self) -> Option<Status> {
        match self.state {
            ExperimentState::Decided(status) => Some(status),
            _ => None,
        }
    }

    /// Turn a decided aggregator into the record to persist.
    ///
    /// Returns `None` while iterations remain, so an undecided experiment
    /// can never be recorded.
    #[must_use]
    pub fn into_record(self, id: &ExperimentId) -> Option<ResultRecord> {
        let status = self.decision()?;
        Some(ResultRecord::new(&id.host, &id.container, status, self.note))
    }
}
