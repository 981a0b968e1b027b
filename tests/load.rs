use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use envparse::{EnvLoader, Error, ParseErrorKind, TargetEnv};

#[test]
fn override_existing_false_skips_existing_values() {
    let dir = make_temp_dir("override-false");
    let file = dir.join(".env");
    write_file(&file, "A=from_file\nB=2\n");

    let mut initial = BTreeMap::new();
    initial.insert("A".to_string(), "existing".to_string());

    let mut loader = EnvLoader::new()
        .path(&file)
        .target(TargetEnv::from_memory(initial))
        .override_existing(false);

    let report = loader.load().expect("load should succeed");
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped_existing, 1);

    let map = loader.target_env().as_memory().expect("memory target");
    assert_eq!(map.get("A").expect("A should exist"), "existing");
    assert_eq!(map.get("B").expect("B should exist"), "2");
}

#[test]
fn override_existing_true_replaces_values() {
    let dir = make_temp_dir("override-true");
    let file = dir.join(".env");
    write_file(&file, "A=\"from file\"\n");

    let mut initial = BTreeMap::new();
    initial.insert("A".to_string(), "existing".to_string());

    let mut loader = EnvLoader::new()
        .path(&file)
        .target(TargetEnv::from_memory(initial))
        .override_existing(true);

    let report = loader.load().expect("load should succeed");
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped_existing, 0);

    let map = loader
        .into_target()
        .into_memory()
        .expect("memory target");
    assert_eq!(map.get("A").expect("A should exist"), "from file");
}

#[test]
fn duplicate_keys_in_one_file_keep_last() {
    let dir = make_temp_dir("duplicates");
    let file = dir.join(".env");
    write_file(&file, "A=first\nA=second\n");

    let mut loader = EnvLoader::new().path(&file);
    let report = loader.load().expect("load should succeed");
    assert_eq!(report.loaded, 1);

    let map = loader.target_env().as_memory().expect("memory target");
    assert_eq!(map.get("A").expect("A should exist"), "second");
}

#[test]
fn parse_only_leaves_target_untouched() {
    let dir = make_temp_dir("parse-only");
    let file = dir.join(".env");
    write_file(&file, "A=1\n");

    let loader = EnvLoader::new().path(&file);
    let parsed = loader.parse_only().expect("parse should succeed");

    assert_eq!(parsed.get("A").map(String::as_str), Some("1"));
    assert!(
        loader
            .target_env()
            .as_memory()
            .expect("memory target")
            .is_empty()
    );
}

#[test]
fn missing_file_returns_io_error() {
    let dir = make_temp_dir("missing");
    let missing = dir.join("missing.env");

    let mut loader = EnvLoader::new().path(missing);
    let err = loader.load().expect_err("expected I/O error");

    match err {
        Error::Io(_) => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_optional_file_loads_nothing() {
    let dir = make_temp_dir("missing-optional");

    let mut loader = EnvLoader::new()
        .path(dir.join("missing.env"))
        .required(false);
    let report = loader.load().expect("load should succeed");

    assert_eq!(report.loaded, 0);
    assert_eq!(report.skipped_existing, 0);
}

#[test]
fn malformed_file_returns_parse_error() {
    let dir = make_temp_dir("malformed");
    let file = dir.join(".env");
    write_file(&file, "A=ok\nBAD LINE\n");

    let mut loader = EnvLoader::new().path(file);
    let err = loader.load().expect_err("expected parse error");

    match err {
        Error::Parse(parse_err) => {
            assert_eq!(parse_err.line, 2);
            assert!(matches!(parse_err.kind, ParseErrorKind::MissingSeparator));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_file_leaves_target_unchanged() {
    let dir = make_temp_dir("malformed-atomic");
    let file = dir.join(".env");
    write_file(&file, "A=ok\nB='open\n");

    let mut loader = EnvLoader::new().path(file);
    loader.load().expect_err("expected parse error");

    let map = loader.target_env().as_memory().expect("memory target");
    assert!(map.is_empty());
}

fn make_temp_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    path.push(format!("envparse-{name}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("failed to create temp dir");
    path
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write test file");
}
