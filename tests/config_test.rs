//! Config loading from key/value entries and files

use std::fs;

use mpi_matrix::artifact::Implementation;
use mpi_matrix::config::{ConfigLoader, DuplicatePolicy, KeyValue};
use mpi_matrix::Error;

const OMPI_304: &str = "https://download.open-mpi.org/release/open-mpi/v3.0/openmpi-3.0.4.tar.bz2";
const OMPI_310: &str = "https://download.open-mpi.org/release/open-mpi/v3.1/openmpi-3.1.0.tar.bz2";
const MPICH_33: &str = "http://www.mpich.org/static/downloads/3.3/mpich-3.3.tar.gz";

#[test]
fn test_load_single_family() {
    let config = ConfigLoader::new()
        .load(vec![
            KeyValue::new("openmpi-3.1.0", OMPI_310),
            KeyValue::new("openmpi-3.0.4", OMPI_304),
        ])
        .unwrap();

    assert_eq!(config.implementation(), Implementation::OpenMpi);
    let versions: Vec<&str> = config.versions().keys().map(String::as_str).collect();
    assert_eq!(versions, ["3.0.4", "3.1.0"]);
    assert!(config
        .versions()
        .values()
        .all(|a| a.implementation() == config.implementation()));
}

#[test]
fn test_conflict_regardless_of_order() {
    for entries in [
        vec![KeyValue::new("a", OMPI_304), KeyValue::new("b", MPICH_33)],
        vec![KeyValue::new("b", MPICH_33), KeyValue::new("a", OMPI_304)],
    ] {
        let err = ConfigLoader::new().load(entries).unwrap_err();
        assert!(
            matches!(err, Error::ImplementationConflict { .. }),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn test_conflict_reports_both_families() {
    let err = ConfigLoader::new()
        .load(vec![KeyValue::new("a", OMPI_304), KeyValue::new("b", MPICH_33)])
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("openmpi"));
    assert!(message.contains("mpich"));
}

#[test]
fn test_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openmpi.conf");
    fs::write(
        &path,
        format!("# Open MPI versions to test\nopenmpi-3.0.4 = {OMPI_304}\n\nopenmpi-3.1.0={OMPI_310}\n"),
    )
    .unwrap();

    let config = ConfigLoader::new().load_file(&path).unwrap();
    assert_eq!(config.len(), 2);
    assert_eq!(config.get("3.1.0").unwrap().location(), OMPI_310);
}

#[test]
fn test_load_file_with_undetectable_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.conf");
    fs::write(&path, format!("a = {OMPI_304}\nb = https://example.com/latest\n")).unwrap();

    let err = ConfigLoader::new().load_file(&path).unwrap_err();
    assert!(matches!(err, Error::Detection { value } if value == "https://example.com/latest"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new()
        .load_file(dir.path().join("absent.conf"))
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_strict_duplicates() {
    let entries = vec![
        KeyValue::new("a", OMPI_304),
        KeyValue::new("b", "https://mirror.example.com/openmpi-3.0.4.tar.gz"),
    ];

    let lenient = ConfigLoader::new().load(entries.clone()).unwrap();
    assert_eq!(lenient.len(), 1);

    let err = ConfigLoader::new()
        .duplicate_policy(DuplicatePolicy::Reject)
        .load(entries)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateVersion { .. }));
}

#[test]
fn test_tab_in_version_is_rejected_before_anything_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openmpi.conf");
    fs::write(&path, "a = https://x/openmpi-3.0\t4.tar.gz\n").unwrap();

    let err = ConfigLoader::new().load_file(&path).unwrap_err();
    assert!(matches!(err, Error::Detection { value } if value == "https://x/openmpi-3.0\t4.tar.gz"));
}

#[test]
fn test_first_openmpi_marker_decides_family() {
    // The host name carries the Open MPI marker, so the MPICH tarball is
    // read as an Open MPI location and no conflict is raised.
    let config = ConfigLoader::new()
        .load(vec![
            KeyValue::new("a", OMPI_304),
            KeyValue::new("b", "https://openmpi-mirror.example.org/mpich-3.2.1.tar.gz"),
        ])
        .unwrap();
    assert_eq!(config.implementation(), Implementation::OpenMpi);
    assert!(config.get("mirror.example.org/mpich-3.2.1").is_some());
}
