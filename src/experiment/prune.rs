//! Resume support: drop experiments already on record

use std::collections::HashSet;

use super::{Experiment, ExperimentId};
use crate::results::ResultRecord;

/// Experiments of `matrix` whose identity does not appear in `history`.
///
/// Status is not inspected: an experiment recorded as ERROR or FAIL counts as
/// attempted and is not retried. Remove its line from the results file to
/// force a re-run. Matrix order is preserved.
#[must_use]
pub fn prune(matrix: &[Experiment], history: &[ResultRecord]) -> Vec<Experiment> {
    let done: HashSet<ExperimentId> = history.iter().map(ResultRecord::id).collect();
    matrix
        .iter()
        .filter(|experiment| !done.contains(&experiment.id()))
        .cloned()
        .collect()
}
