//! Experiments and the host x container matrix
//!
//! ## Overview
//!
//! ```text
//! Config (k versions) ──build_matrix──> k² Experiments
//!                                            │
//!         results history ──────prune────────┘──> pending Experiments
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use mpi_matrix::config::{ConfigLoader, KeyValue};
//! use mpi_matrix::experiment::{build_matrix, prune};
//!
//! let config = ConfigLoader::new().load(vec![
//!     KeyValue::new("a", "https://x/openmpi-3.0.4.tar.bz2"),
//!     KeyValue::new("b", "https://x/openmpi-3.1.0.tar.bz2"),
//! ])?;
//! let matrix = build_matrix(&config);
//! assert_eq!(matrix.len(), 4);
//! assert_eq!(prune(&matrix, &[]).len(), 4);
//! # Ok::<(), mpi_matrix::Error>(())
//! ```

mod matrix;
mod prune;

pub use matrix::build_matrix;
pub use prune::prune;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactDescriptor;

/// Identity of an experiment: `(host version, container version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperimentId {
    /// Host-side version
    pub host: String,
    /// Container-side version
    pub container: String,
}

impl ExperimentId {
    /// Create an identity.
    #[must_use]
    pub fn new(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host {} / container {}", self.host, self.container)
    }
}

/// One host artifact paired with one container artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Experiment {
    host: ArtifactDescriptor,
    container: ArtifactDescriptor,
}

impl Experiment {
    /// Pair two artifacts.
    #[must_use]
    pub const fn new(host: ArtifactDescriptor, container: ArtifactDescriptor) -> Self {
        Self { host, container }
    }

    /// Artifact installed on the host.
    #[must_use]
    pub const fn host(&self) -> &ArtifactDescriptor {
        &self.host
    }

    /// Artifact installed in the container image.
    #[must_use]
    pub const fn container(&self) -> &ArtifactDescriptor {
        &self.container
    }

    /// Identity used for pruning and result records.
    #[must_use]
    pub fn id(&self) -> ExperimentId {
        ExperimentId::new(self.host.version(), self.container.version())
    }

    /// True for the self-pair (same version on both sides).
    #[must_use]
    pub fn is_diagonal(&self) -> bool {
        self.host.version() == self.container.version()
    }
}
