//! Converting a directory tree on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use levels::{BatchConverter, ConvertOptions, Level, ProjectError};

use crate::helpers::source_fixtures::SHAPES;

fn populate(root: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(relative, text)| {
            let path = root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, text).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_directory_written_next_to_inputs() {
    let dir = TempDir::new().unwrap();
    populate(dir.path(), SHAPES);

    let report = BatchConverter::default()
        .convert_directory(dir.path())
        .unwrap();

    assert!(report.is_success(), "{:?}", report.render_failures());
    assert_eq!(report.levels.len(), 1);
    assert_eq!(report.levels[0].level, Level::Intermediate);

    let mut written = report.written.clone();
    written.sort();
    assert_eq!(
        written,
        vec![
            dir.path().join("app/Main.java"),
            dir.path().join("shapes/Shape.java"),
            dir.path().join("shapes/Square.java"),
        ]
    );
    let square = fs::read_to_string(dir.path().join("shapes/Square.java")).unwrap();
    assert!(square.starts_with("package shapes;\n"));
    assert!(square.contains("public int side() {"));
}

#[test]
fn test_converting_twice_gives_identical_output() {
    let dir = TempDir::new().unwrap();
    populate(dir.path(), SHAPES);
    let options = ConvertOptions::default().dry_run();

    let first = BatchConverter::new(options.clone())
        .convert_directory(dir.path())
        .unwrap();
    let second = BatchConverter::new(options)
        .convert_directory(dir.path())
        .unwrap();

    let first = &first.levels[0].result.outputs;
    let second = &second.levels[0].result.outputs;
    assert_eq!(first, second);
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nowhere");
    let err = BatchConverter::default()
        .convert_directory(&missing)
        .unwrap_err();
    assert!(matches!(err, ProjectError::NotADirectory(path) if path == missing));
}
