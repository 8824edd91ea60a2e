//! Append-only, crash-safe results file
//!
//! Every [`ResultsStore::append`] is written and synced before it returns,
//! so a decided outcome survives a process kill right after the call.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ResultRecord;
use crate::{Error, Result};

/// Load every record of a results file, in file order.
///
/// A missing file is an empty history. Blank lines are skipped; any other
/// malformed line aborts the whole load.
///
/// # Errors
///
/// Returns [`Error::ResultsParse`] for a corrupted line or [`Error::Io`] if
/// the file exists but cannot be read.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no results file, starting from an empty history");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = ResultRecord::parse_line(line).map_err(|reason| Error::ResultsParse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        records.push(record);
    }
    debug!(path = %path.display(), records = records.len(), "loaded results history");
    Ok(records)
}

/// Open handle on a results file, held for the duration of a run.
#[derive(Debug)]
pub struct ResultsStore {
    path: PathBuf,
    file: File,
}

impl ResultsStore {
    /// Open `path` for appending, creating it if absent.
    ///
    /// If a previous run was killed mid-line, the torn line is terminated so
    /// new records never merge into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or repaired.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let created = !path.exists();
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        if created {
            if let Err(e) = sync_parent_dir(&path) {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not sync results directory, new file may not be durable"
                );
            }
        } else if !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
            file.sync_all()?;
        }

        debug!(path = %path.display(), created, "opened results store");
        Ok(Self { path, file })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and sync it to stable storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnwritableRecord`] if the record would not parse back
    /// as a single line, or [`Error::Io`] if the write, flush or sync fails.
    pub fn append(&mut self, record: &ResultRecord) -> Result<()> {
        if let Some(reason) = record.unwritable_reason() {
            return Err(Error::UnwritableRecord {
                host: record.host_version().to_string(),
                container: record.container_version().to_string(),
                reason,
            });
        }
        self.file.write_all(record.to_line().as_bytes())?;
        self.file.flush()?;
        self.file.sync_all()?;
        debug!(
            host = record.host_version(),
            container = record.container_version(),
            status = %record.status(),
            "result appended"
        );
        Ok(())
    }
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Make the new directory entry durable too.
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Status;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = load(dir.path().join("absent.txt")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let mut store = ResultsStore::open(&path).unwrap();
        store
            .append(&ResultRecord::new("3.0.4", "3.1.0", Status::Pass, "ok"))
            .unwrap();
        store
            .append(&ResultRecord::new("3.1.0", "3.0.4", Status::Error, "no launcher"))
            .unwrap();

        let records = load(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status(), Status::Error);
        assert_eq!(records[1].note(), "no launcher");
    }

    #[test]
    fn test_record_durable_without_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let mut store = ResultsStore::open(&path).unwrap();
        store
            .append(&ResultRecord::new("1", "1", Status::Fail, ""))
            .unwrap();
        // Store still open: the record must already be visible.
        assert_eq!(load(&path).unwrap().len(), 1);
        drop(store);
    }

    #[test]
    fn test_reopen_keeps_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        ResultsStore::open(&path)
            .unwrap()
            .append(&ResultRecord::new("1", "1", Status::Pass, ""))
            .unwrap();
        ResultsStore::open(&path)
            .unwrap()
            .append(&ResultRecord::new("1", "2", Status::Pass, ""))
            .unwrap();

        assert_eq!(load(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_torn_line_is_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(&path, "1\t1\tPASS\t\n1\t2\tPA").unwrap();

        let mut store = ResultsStore::open(&path).unwrap();
        store
            .append(&ResultRecord::new("2", "2", Status::Pass, ""))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "1\t1\tPASS\t\n1\t2\tPA\n2\t2\tPASS\t\n");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::ResultsParse { line: 2, .. }));
    }

    #[test]
    fn test_unparseable_record_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let mut store = ResultsStore::open(&path).unwrap();
        let err = store
            .append(&ResultRecord::new("3.0\t4", "3.1.0", Status::Pass, ""))
            .unwrap_err();
        assert!(matches!(err, Error::UnwritableRecord { .. }));

        store
            .append(&ResultRecord::new("3.1.0", "3.1.0", Status::Pass, ""))
            .unwrap();
        assert_eq!(load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_sync_parent_dir_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sync_parent_dir(&dir.path().join("results.txt")).is_ok());
        assert!(sync_parent_dir(&dir.path().join("absent").join("results.txt")).is_err());
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(&path, "\n1\t1\tPASS\tok\n\n").unwrap();
        assert_eq!(load(&path).unwrap().len(), 1);
    }
}
