//! Post-run analysis of a results history

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;

use super::{ResultRecord, Status};
use crate::experiment::ExperimentId;

/// Fold a history into one record per identity; the latest line wins.
#[must_use]
pub fn latest(history: &[ResultRecord]) -> BTreeMap<ExperimentId, &ResultRecord> {
    history.iter().map(|record| (record.id(), record)).collect()
}

/// Counts and compatibility table for a results history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Experiments whose latest record is PASS
    pub passed: usize,
    /// Experiments whose latest record is FAIL
    pub failed: usize,
    /// Experiments whose latest record is ERROR
    pub errored: usize,
    /// Latest status per `(host, container)` pair
    pub cells: BTreeMap<String, BTreeMap<String, Status>>,
}

impl Summary {
    /// Summarize a history.
    #[must_use]
    pub fn from_records(history: &[ResultRecord]) -> Self {
        let mut summary = Self::default();
        for (id, record) in latest(history) {
            match record.status() {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::Error => summary.errored += 1,
            }
            summary
                .cells
                .entry(id.host)
                .or_default()
                .insert(id.container, record.status());
        }
        summary
    }

    /// Number of distinct experiments on record.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.errored
    }

    /// Host rows x container columns; `P`/`F`/`E`, `-` when not run.
    #[must_use]
    pub fn render_table(&self) -> String {
        let containers: BTreeSet<&str> = self
            .cells
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        let width = self
            .cells
            .keys()
            .map(String::as_str)
            .chain(containers.iter().copied())
            .map(str::len)
            .max()
            .unwrap_or(0)
            .max("host\\container".len());

        let mut out = String::new();
        let _ = write!(out, "{:<width$}", "host\\container");
        for container in &containers {
            let _ = write!(out, " {container:>width$}");
        }
        out.push('\n');

        for (host, row) in &self.cells {
            let _ = write!(out, "{host:<width$}");
            for container in &containers {
                let cell = match row.get(*container) {
                    Some(Status::Pass) => "P",
                    Some(Status::Fail) => "F",
                    Some(Status::Error) => "E",
                    None => "-",
                };
                let _ = write!(out, " {cell:>width$}");
            }
            out.push('\n');
        }
        out
    }
}
