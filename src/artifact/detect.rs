//! Implementation/version detection from download locations
//!
//! A location such as
//! `https://download.open-mpi.org/release/open-mpi/v3.0/openmpi-3.0.4.tar.bz2`
//! carries the family marker (`openmpi-`) followed by the version and a
//! `.tar` archive suffix. The version is the text strictly between the two.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Implementation;

/// First occurrence of the marker, then everything up to the next `.tar`.
fn version_pattern(marker: &str) -> Regex {
    let pattern = format!(r"^.*?{}(?P<version>.*?)\.tar", regex::escape(marker));
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid version pattern for {marker}: {e}"))
}

static PATTERNS: Lazy<Vec<(Implementation, Regex)>> = Lazy::new(|| {
    Implementation::DETECTION_ORDER
        .iter()
        .filter_map(|&implementation| {
            implementation
                .marker()
                .map(|marker| (implementation, version_pattern(marker)))
        })
        .collect()
});

/// Versions end up as tab-separated fields of the results file.
fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && !version
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Detect the implementation family and version of a download location.
///
/// Families are tried in [`Implementation::DETECTION_ORDER`]; the first one
/// whose first marker is followed by `.tar` wins, provided the span between
/// them is a non-empty version free of whitespace and control characters.
/// Returns `None` when no family matches.
///
/// # Example
///
/// ```rust
/// use mpi_matrix::artifact::{detect, Implementation};
///
/// let detected = detect("http://www.mpich.org/static/downloads/3.3/mpich-3.3.tar.gz");
/// assert_eq!(detected, Some((Implementation::Mpich, "3.3".to_string())));
/// assert_eq!(detect("https://example.com/mpich-3.3.zip"), None);
/// ```
#[must_use]
pub fn detect(location: &str) -> Option<(Implementation, String)> {
    PATTERNS.iter().find_map(|(implementation, pattern)| {
        let version = pattern.captures(location)?.name("version")?.as_str();
        is_valid_version(version).then(|| (*implementation, version.to_string()))
    })
}
