//! Matrix expansion

use super::Experiment;
use crate::config::Config;

/// Cartesian product of the config's versions with themselves.
///
/// Yields `k²` experiments for `k` versions, diagonal included. Order is
/// host-major, both sides sorted by version string, so that result files are
/// stable across runs of the same config.
#[must_use]
pub fn build_matrix(config: &Config) -> Vec<Experiment> {
    let artifacts = config.versions();
    let mut matrix = Vec::with_capacity(artifacts.len() * artifacts.len());
    for host in artifacts.values() {
        for container in artifacts.values() {
            matrix.push(Experiment::new(host.clone(), container.clone()));
        }
    }
    matrix
}
