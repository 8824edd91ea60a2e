//! Experiment outcomes and their on-disk history
//!
//! ## File format
//!
//! One record per line, four tab-separated fields:
//!
//! ```text
//! hostVersion \t containerVersion \t PASS|FAIL|ERROR \t note
//! ```
//!
//! The file is append-only. A missing file means an empty history.

mod store;
mod summary;

pub use store::{load, ResultsStore};
pub use summary::{latest, Summary};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentId;

/// Aggregate verdict for an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Every iteration ran and passed.
    Pass,
    /// Every iteration ran, at least one did not pass.
    Fail,
    /// An iteration could not be run (infrastructure failure).
    Error,
}

impl Status {
    /// Token written to the results file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            "ERROR" => Ok(Self::Error),
            other => Err(format!("unknown status {other:?} (expected PASS, FAIL or ERROR)")),
        }
    }
}

/// Outcome of one experiment, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    host_version: String,
    container_version: String,
    status: Status,
    note: String,
}

impl ResultRecord {
    /// Create a record. Tabs and line breaks in `note` become spaces.
    #[must_use]
    pub fn new(
        host_version: impl Into<String>,
        container_version: impl Into<String>,
        status: Status,
        note: impl AsRef<str>,
    ) -> Self {
        Self {
            host_version: host_version.into(),
            container_version: container_version.into(),
            status,
            note: sanitize_note(note.as_ref()),
        }
    }

    /// Host-side version.
    #[must_use]
    pub fn host_version(&self) -> &str {
        &self.host_version
    }

    /// Container-side version.
    #[must_use]
    pub fn container_version(&self) -> &str {
        &self.container_version
    }

    /// Aggregate status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Diagnostic text.
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Identity shared with [`crate::experiment::Experiment::id`].
    #[must_use]
    pub fn id(&self) -> ExperimentId {
        ExperimentId::new(&self.host_version, &self.container_version)
    }

    /// Why this record cannot be written as one parseable line, if it can't.
    #[must_use]
    pub fn unwritable_reason(&self) -> Option<String> {
        [
            ("host", &self.host_version),
            ("container", &self.container_version),
        ]
        .into_iter()
        .find_map(|(side, version)| {
            if version.is_empty() {
                Some(format!("empty {side} version"))
            } else if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
                Some(format!("{side} version {version:?} contains whitespace"))
            } else {
                None
            }
        })
    }

    /// Serialize as one results-file line, newline included.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\n",
            self.host_version, self.container_version, self.status, self.note
        )
    }

    /// Parse one results-file line (without its newline).
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the line does not have
    /// exactly four fields, a version is empty, or the status is unknown.
    pub fn parse_line(line: &str) -> std::result::Result<Self, String> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();
        let [host, container, status, note] = fields.as_slice() else {
            return Err(format!(
                "expected 4 tab-separated fields, found {}",
                fields.len()
            ));
        };
        if host.is_empty() || container.is_empty() {
            return Err("empty host or container version".to_string());
        }
        Ok(Self {
            host_version: (*host).to_string(),
            container_version: (*container).to_string(),
            status: status.parse()?,
            note: (*note).to_string(),
        })
    }
}

fn sanitize_note(note: &str) -> String {
    note.trim()
        .split(['\t', '\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tokens() {
        for status in [Status::Pass, Status::Fail, Status::Error] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("pass".parse::<Status>().is_err());
    }

    #[test]
    fn test_note_is_sanitized() {
        let record = ResultRecord::new("1", "2", Status::Fail, "line one\nline\ttwo\r\n");
        assert_eq!(record.note(), "line one line two");
        assert_eq!(record.to_line(), "1\t2\tFAIL\tline one line two\n");
    }

    #[test]
    fn test_parse_line_with_empty_note() {
        let record = ResultRecord::parse_line("3.0.4\t3.1.0\tPASS\t").unwrap();
        assert_eq!(record, ResultRecord::new("3.0.4", "3.1.0", Status::Pass, ""));
    }

    #[test]
    fn test_unwritable_versions() {
        assert!(ResultRecord::new("1", "2", Status::Pass, "").unwritable_reason().is_none());
        assert!(ResultRecord::new("", "2", Status::Pass, "").unwritable_reason().is_some());
        let reason = ResultRecord::new("1", "2\t3", Status::Pass, "")
            .unwritable_reason()
            .unwrap();
        assert!(reason.contains("container"));
    }

    #[test]
    fn test_parse_line_crlf() {
        let record = ResultRecord::parse_line("a\tb\tERROR\tboom\r").unwrap();
        assert_eq!(record.note(), "boom");
    }

    #[test]
    fn test_parse_line_rejects_bad_shapes() {
        assert!(ResultRecord::parse_line("a\tb\tPASS").is_err());
        assert!(ResultRecord::parse_line("a\tb\tPASS\tx\ty").is_err());
        assert!(ResultRecord::parse_line("\tb\tPASS\tx").is_err());
        assert!(ResultRecord::parse_line("a\tb\tMAYBE\tx").is_err());
    }
}
