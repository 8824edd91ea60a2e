//! Validated test configuration
//!
//! A [`Config`] lists versions of exactly one MPI implementation, keyed by
//! version string. It is built from ordered key/value entries by
//! [`ConfigLoader`]; the entry keys are informational, only the values
//! (download locations) are inspected.
//!
//! ```rust
//! use mpi_matrix::config::{ConfigLoader, KeyValue};
//! use mpi_matrix::artifact::Implementation;
//!
//! let config = ConfigLoader::new().load(vec![
//!     KeyValue::new("a", "https://x/openmpi-3.0.4.tar.bz2"),
//!     KeyValue::new("b", "https://x/openmpi-3.1.0.tar.bz2"),
//! ])?;
//! assert_eq!(config.implementation(), Implementation::OpenMpi);
//! assert_eq!(config.len(), 2);
//! # Ok::<(), mpi_matrix::Error>(())
//! ```

pub mod kv;
mod settings;

pub use kv::KeyValue;
pub use settings::{ErrorPolicy, HarnessSettings, HarnessSettingsBuilder, RunCount};

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifact::{ArtifactDescriptor, Implementation};
use crate::{Error, Result};

/// How a repeated version key is handled while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Later entry silently replaces the earlier one.
    #[default]
    LastWriteWins,
    /// Repeated versions fail with [`Error::DuplicateVersion`].
    Reject,
}

/// Versions of a single MPI implementation to test against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    implementation: Implementation,
    versions: BTreeMap<String, ArtifactDescriptor>,
}

impl Config {
    /// Implementation family shared by every entry.
    #[must_use]
    pub const fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Artifacts keyed by version, in version-string order.
    #[must_use]
    pub const fn versions(&self) -> &BTreeMap<String, ArtifactDescriptor> {
        &self.versions
    }

    /// Look up one version.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<&ArtifactDescriptor> {
        self.versions.get(version)
    }

    /// Number of distinct versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false for a loaded config; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Builds a [`Config`] from raw key/value entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigLoader {
    duplicates: DuplicatePolicy,
}

impl ConfigLoader {
    /// Loader with the default (last-write-wins) duplicate policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate version policy.
    #[must_use]
    pub const fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Detect every entry and assemble the config.
    ///
    /// The first entry fixes the implementation; loading aborts on the first
    /// undetectable value or on an entry from another family.
    ///
    /// # Errors
    ///
    /// [`Error::Detection`], [`Error::ImplementationConflict`],
    /// [`Error::DuplicateVersion`] (strict policy), or [`Error::EmptyConfig`].
    pub fn load<I>(&self, entries: I) -> Result<Config>
    where
        I: IntoIterator<Item = KeyValue>,
    {
        let mut implementation: Option<Implementation> = None;
        let mut versions = BTreeMap::new();

        for entry in entries {
            let artifact = ArtifactDescriptor::from_location(entry.value)?;

            match implementation {
                None => implementation = Some(artifact.implementation()),
                Some(first) if first != artifact.implementation() => {
                    return Err(Error::ImplementationConflict {
                        first: first.to_string(),
                        second: artifact.implementation().to_string(),
                        value: artifact.location().to_string(),
                    });
                }
                Some(_) => {}
            }

            match versions.entry(artifact.version().to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(artifact);
                }
                Entry::Occupied(mut slot) => {
                    if self.duplicates == DuplicatePolicy::Reject {
                        return Err(Error::DuplicateVersion {
                            version: slot.key().clone(),
                            first: slot.get().location().to_string(),
                            second: artifact.location().to_string(),
                        });
                    }
                    debug!(
                        version = %slot.key(),
                        replaced = %slot.get().location(),
                        "duplicate version, keeping the later location"
                    );
                    slot.insert(artifact);
                }
            }
        }

        let implementation = implementation.ok_or(Error::EmptyConfig)?;
        Ok(Config {
            implementation,
            versions,
        })
    }

    /// Read a key/value file and load it.
    ///
    /// # Errors
    ///
    /// IO and key/value syntax errors, plus everything [`ConfigLoader::load`] returns.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Config> {
        let entries = kv::load_file(path)?;
        self.load(entries)
    }
}
