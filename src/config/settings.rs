//! Run-time settings for one harness invocation

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use crate::artifact::Implementation;
use crate::config::DuplicatePolicy;
use crate::{Error, Result};

/// What the execution loop does after an infrastructure failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Record ERROR and move on to the next experiment.
    #[default]
    Continue,
    /// Record ERROR, then stop the batch with [`Error::Aborted`].
    Abort,
}

/// Number of iterations per experiment (always at least 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunCount(NonZeroU32);

impl RunCount {
    /// A single iteration.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Validate a user-supplied count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRunCount`] for zero, negative, or
    /// out-of-range values.
    pub fn new(count: i64) -> Result<Self> {
        u32::try_from(count)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(Error::InvalidRunCount(count))
    }

    /// Count as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for RunCount {
    fn default() -> Self {
        Self::ONE
    }
}

/// Explicit, immutable settings passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    results_path: PathBuf,
    run_count: RunCount,
    error_policy: ErrorPolicy,
    duplicate_policy: DuplicatePolicy,
}

impl HarnessSettings {
    /// Start building settings for the given results file.
    #[must_use]
    pub fn builder(results_path: impl Into<PathBuf>) -> HarnessSettingsBuilder {
        HarnessSettingsBuilder::new(results_path)
    }

    /// Results file used when the operator does not name one.
    #[must_use]
    pub fn default_results_path(implementation: Implementation) -> PathBuf {
        PathBuf::from(format!("{}-results.txt", implementation.id()))
    }

    /// Log file written alongside the console output in verbose mode.
    #[must_use]
    pub fn default_log_path(implementation: Implementation) -> PathBuf {
        PathBuf::from(format!("{}.log", implementation.id()))
    }

    /// Results file.
    #[must_use]
    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    /// Iterations per experiment.
    #[must_use]
    pub const fn run_count(&self) -> RunCount {
        self.run_count
    }

    /// Infrastructure failure policy.
    #[must_use]
    pub const fn error_policy(&self) -> ErrorPolicy {
        self.error_policy
    }

    /// Duplicate version policy for config loading.
    #[must_use]
    pub const fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }
}

/// Builder for `HarnessSettings`.
#[derive(Debug)]
pub struct HarnessSettingsBuilder {
    results_path: PathBuf,
    run_count: RunCount,
    error_policy: ErrorPolicy,
    duplicate_policy: DuplicatePolicy,
}

impl HarnessSettingsBuilder {
    /// Create a builder with default policies and a single iteration.
    #[must_use]
    pub fn new(results_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            run_count: RunCount::ONE,
            error_policy: ErrorPolicy::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Set the iteration count.
    #[must_use]
    pub const fn run_count(mut self, run_count: RunCount) -> Self {
        self.run_count = run_count;
        self
    }

    /// Set the infrastructure failure policy.
    #[must_use]
    pub const fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the duplicate version policy.
    #[must_use]
    pub const fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Build the `HarnessSettings`.
    #[must_use]
    pub fn build(self) -> HarnessSettings {
        HarnessSettings {
            results_path: self.results_path,
            run_count: self.run_count,
            error_policy: self.error_policy,
            duplicate_policy: self.duplicate_policy,
        }
    }
}
