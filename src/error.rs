//! Error types for mpi-matrix
//!
//! Configuration and storage-integrity errors abort a run. Runner
//! infrastructure failures are recorded as ERROR results instead and only
//! surface here as [`Error::Aborted`] under the abort-on-error policy.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mpi-matrix error types
#[derive(Error, Debug)]
pub enum Error {
    /// A config value matches no known implementation/version pattern
    #[error("cannot detect the MPI implementation from {value:?}")]
    Detection {
        /// Offending download location
        value: String,
    },

    /// A config mixes implementation families
    #[error("detected two implementations of MPI ({first} and {second}) at {value:?}\nA configuration file must list versions of a single implementation")]
    ImplementationConflict {
        /// Implementation fixed by the first entry
        first: String,
        /// Conflicting implementation
        second: String,
        /// Location that introduced the conflict
        value: String,
    },

    /// The same version string is produced by two locations (strict policy only)
    #[error("version {version} is listed twice ({first} and {second})")]
    DuplicateVersion {
        /// Duplicated version key
        version: String,
        /// Location recorded first
        first: String,
        /// Location that repeated the version
        second: String,
    },

    /// A config without a single entry
    #[error("configuration does not list any MPI version")]
    EmptyConfig,

    /// Malformed line in a key/value configuration file
    #[error("key/value config line {line}: {reason}")]
    KeyValue {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Corrupted line in a results file
    #[error("{}:{line}: {reason}\nFix or remove this line before resuming", .path.display())]
    ResultsParse {
        /// Results file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Run count must be strictly positive
    #[error("invalid run count {0}: the number of iterations must be at least 1")]
    InvalidRunCount(i64),

    /// Batch stopped on an infrastructure failure (abort-on-error policy)
    #[error("aborted after infrastructure failure (host {host}, container {container}): {reason}")]
    Aborted {
        /// Host version of the failing experiment
        host: String,
        /// Container version of the failing experiment
        container: String,
        /// Runner diagnostic
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record whose versions would not survive the tab-separated format
    #[error("refusing to record host {host:?} / container {container:?}: {reason}")]
    UnwritableRecord {
        /// Host version
        host: String,
        /// Container version
        container: String,
        /// What is wrong with it
        reason: String,
    },
}
