//! # mpi-matrix: Resumable MPI Compatibility Matrix
//!
//! Given download locations for several releases of one MPI implementation,
//! mpi-matrix detects each release's version, pairs every release on the host
//! with every release inside a container, runs each pair through an external
//! [`runner::ExperimentRunner`] N times, and appends one PASS/FAIL/ERROR line
//! per pair to a results file.
//!
//! ## Design Principles
//!
//! - **Crash safety**: each outcome is synced to disk before the next
//!   experiment starts
//! - **Idempotent resume**: anything already on record is pruned, whatever its
//!   status
//! - **One family per config**: mixing Open MPI, MPICH and Intel MPI is an
//!   error
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mpi_matrix::config::HarnessSettings;
//! use mpi_matrix::engine::Pipeline;
//! use mpi_matrix::runner::CommandRunner;
//!
//! let settings = HarnessSettings::builder("openmpi-results.txt").build();
//! let pipeline = Pipeline::from_config_file("etc/openmpi.conf", settings)?;
//!
//! let mut runner = CommandRunner::new("./run-benchmark.sh", vec![
//!     "{host_version}".to_string(),
//!     "{container_version}".to_string(),
//! ]);
//! let report = pipeline.run(&mut runner)?;
//! println!("{} attempted, {} skipped", report.attempted, report.skipped);
//! # Ok::<(), mpi_matrix::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod results;
pub mod runner;

pub use error::{Error, Result};
