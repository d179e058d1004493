#![allow(clippy::unwrap_used, clippy::expect_used)]

use tempfile::TempDir;

use super::*;

fn write(dir: &TempDir, relative: &str, text: &str) -> PathBuf {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_directory_grouped_by_level() {
    let dir = TempDir::new().unwrap();
    write(&dir, "shapes/Point.dj0", "class Point { int x; }");
    write(&dir, "shapes/Bad.dj1", "class Bad { int f() { } }");
    write(&dir, "Full.java", "class Full {}\n");

    let report = BatchConverter::default()
        .convert_directory(dir.path())
        .unwrap();

    let levels: Vec<Level> = report.levels.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![Level::Elementary, Level::Intermediate, Level::Full]);
    assert!(!report.is_success());
    assert_eq!(report.failure_count(), 1);
    assert_eq!(
        &*report.result_for(Level::Intermediate).unwrap().semantic_failures[0].message,
        "missing return statement"
    );

    // Full-level inputs already are .java files and stay untouched.
    assert_eq!(report.written, vec![dir.path().join("shapes/Point.java")]);
    let text = fs::read_to_string(dir.path().join("shapes/Point.java")).unwrap();
    assert!(text.contains("public Point(int x) {"));
    assert!(!dir.path().join("shapes/Bad.java").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let point = write(&dir, "Point.dj0", "class Point { int x; }");

    let report = BatchConverter::new(ConvertOptions::default().dry_run())
        .convert_paths(&[point.clone()])
        .unwrap();

    assert!(report.is_success());
    assert!(report.written.is_empty());
    assert!(!dir.path().join("Point.java").exists());
    let result = report.result_for(Level::Elementary).unwrap();
    assert!(result.output(&point).unwrap().contains("public int x()"));
}

#[test]
fn test_level_override_ignores_extension() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "Point.txt", "class Point { int x; }");

    let err = BatchConverter::default()
        .convert_paths(&[source.clone()])
        .unwrap_err();
    assert!(matches!(err, ProjectError::UnsupportedExtension(_)));

    let options = ConvertOptions::default().with_level(Level::Advanced);
    let report = BatchConverter::new(options).convert_paths(&[source]).unwrap();
    assert_eq!(report.levels.len(), 1);
    assert_eq!(report.levels[0].level, Level::Advanced);
    assert_eq!(report.written, vec![dir.path().join("Point.java")]);
}

#[test]
fn test_custom_output_extension() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "A.dj2", "class A {}");
    let options = ConvertOptions {
        output_extension: "out.java".to_string(),
        ..ConvertOptions::default()
    };

    let report = BatchConverter::new(options).convert_paths(&[source]).unwrap();
    assert_eq!(report.written, vec![dir.path().join("A.out.java")]);
}

#[test]
fn test_render_failures_use_input_paths() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "A.java", "class A extends Shap {}");

    let report = BatchConverter::default().convert_paths(&[source.clone()]).unwrap();
    assert_eq!(
        report.render_failures(),
        vec![format!(
            "[{}: (1,17)-(1,21)] cannot find class 'Shap'",
            source.display()
        )]
    );
}
