//! Versioned MPI build artifacts
//!
//! An artifact is one downloadable release of an MPI implementation. Its
//! identity inside a configuration is the version string recovered from the
//! download location by [`detect`].
//!
//! ```rust
//! use mpi_matrix::artifact::{ArtifactDescriptor, Implementation};
//!
//! let artifact = ArtifactDescriptor::from_location(
//!     "https://download.open-mpi.org/release/open-mpi/v3.0/openmpi-3.0.4.tar.bz2",
//! )?;
//! assert_eq!(artifact.implementation(), Implementation::OpenMpi);
//! assert_eq!(artifact.version(), "3.0.4");
//! # Ok::<(), mpi_matrix::Error>(())
//! ```

mod detect;

pub use detect::detect;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// MPI implementation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    /// Open MPI (`openmpi-<version>.tar.*`)
    #[serde(rename = "openmpi")]
    OpenMpi,
    /// MPICH (`mpich-<version>.tar.*`)
    Mpich,
    /// Intel MPI (`l_mpi_<version>.tar.*`)
    #[serde(rename = "intel")]
    IntelMpi,
    /// Unrecognized family
    Unknown,
}

impl Implementation {
    /// Families in detection priority order.
    pub const DETECTION_ORDER: [Self; 3] = [Self::OpenMpi, Self::Mpich, Self::IntelMpi];

    /// Short lowercase identifier, used for default file names.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::OpenMpi => "openmpi",
            Self::Mpich => "mpich",
            Self::IntelMpi => "intel",
            Self::Unknown => "unknown",
        }
    }

    /// Substring that precedes the version in a download location.
    #[must_use]
    pub const fn marker(self) -> Option<&'static str> {
        match self {
            Self::OpenMpi => Some("openmpi-"),
            Self::Mpich => Some("mpich-"),
            Self::IntelMpi => Some("l_mpi_"),
            Self::Unknown => None,
        }
    }

    /// Parse an identifier as produced by [`Implementation::id`].
    ///
    /// Anything unrecognized maps to [`Implementation::Unknown`].
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            "openmpi" => Self::OpenMpi,
            "mpich" => Self::Mpich,
            "intel" => Self::IntelMpi,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One versioned build artifact. Immutable once detected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    implementation: Implementation,
    version: String,
    location: String,
}

impl ArtifactDescriptor {
    /// Create a descriptor from already-known parts.
    #[must_use]
    pub fn new(
        implementation: Implementation,
        version: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            implementation,
            version: version.into(),
            location: location.into(),
        }
    }

    /// Detect implementation and version from a download location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detection`] if no implementation pattern matches.
    pub fn from_location(location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        match detect(&location) {
            Some((implementation, version)) => Ok(Self {
                implementation,
                version,
                location,
            }),
            None => Err(Error::Detection { value: location }),
        }
    }

    /// Implementation family.
    #[must_use]
    pub const fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Release version, e.g. `3.0.4`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Download location the version was detected from.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}
