//! Key/value configuration files
//!
//! One `key = value` pair per line. Blank lines and `#` comments are
//! skipped; the value keeps any further `=` characters.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// One entry of a key/value file, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Entry key (e.g. `openmpi-3.0.4`)
    pub key: String,
    /// Entry value (a download location)
    pub value: String,
}

impl KeyValue {
    /// Create an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parse key/value text.
///
/// # Errors
///
/// Returns [`Error::KeyValue`] for a non-comment line without `=` or with an
/// empty key.
pub fn parse(text: &str) -> Result<Vec<KeyValue>> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| Error::KeyValue {
            line: idx + 1,
            reason: format!("expected `key = value`, got {line:?}"),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::KeyValue {
                line: idx + 1,
                reason: "empty key".to_string(),
            });
        }
        entries.push(KeyValue::new(key, value.trim()));
    }
    Ok(entries)
}

/// Read and parse a key/value file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or a parse error.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<KeyValue>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# Open MPI releases\n\nopenmpi-3.0.4 = https://x/openmpi-3.0.4.tar.bz2\n   # indented comment\n";
        let entries = parse(text).unwrap();
        assert_eq!(
            entries,
            vec![KeyValue::new("openmpi-3.0.4", "https://x/openmpi-3.0.4.tar.bz2")]
        );
    }

    #[test]
    fn test_parse_keeps_equals_in_value() {
        let entries = parse("k=https://x/get?file=mpich-3.3.tar.gz").unwrap();
        assert_eq!(entries[0].value, "https://x/get?file=mpich-3.3.tar.gz");
    }

    #[test]
    fn test_parse_preserves_order() {
        let entries = parse("b=2\na=1\nc=3").unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_parse_missing_separator() {
        let err = parse("a=1\nnot a pair\n").unwrap_err();
        assert!(matches!(err, Error::KeyValue { line: 2, .. }));
    }

    #[test]
    fn test_parse_empty_key() {
        let err = parse(" = value").unwrap_err();
        assert!(matches!(err, Error::KeyValue { line: 1, .. }));
    }
}
