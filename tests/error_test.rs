//! Tests for error types

use cairn_report::Error;
use std::path::PathBuf;

#[test]
fn test_missing_input_error() {
    let error = Error::MissingInput {
        configuration: "fuse_docker".to_string(),
        trial: PathBuf::from("results/io/3"),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("fuse_docker"));
    assert!(error_str.contains("results/io/3"));
    assert!(error.is_skippable());
}

#[test]
fn test_ambiguous_match_error() {
    let error = Error::AmbiguousMatch {
        configuration: "cairn".to_string(),
        trial: PathBuf::from("results/1"),
        candidates: vec![PathBuf::from("cairn_a.json"), PathBuf::from("cairn_b.json")],
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("matches 2 files"));
    assert!(error_str.contains("not unique"));
    assert!(!error.is_skippable());
}

#[test]
fn test_malformed_result_error() {
    let error = Error::MalformedResult {
        path: PathBuf::from("local.json"),
        reason: "missing 'results'".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("malformed result file local.json"));
    assert!(error_str.contains("missing 'results'"));
}

#[test]
fn test_invalid_series_error() {
    let error = Error::InvalidSeries {
        configuration: "docker".to_string(),
        reason: "duplicate iteration count 20".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("configuration 'docker'"));
    assert!(!error_str.contains("file"));
}

#[test]
fn test_malformed_log_error() {
    let error = Error::MalformedLog {
        path: PathBuf::from("cairn.log"),
        line: 7,
        reason: "expected 4 fields, found 2".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("cairn.log at line 7"));
}

#[test]
fn test_insufficient_data_error() {
    let error = Error::InsufficientData {
        configuration: "docker".to_string(),
        points: 1,
    };
    assert!(format!("{error}").contains("need at least 2"));
}

#[test]
fn test_normalization_errors() {
    let zero = Error::ZeroBaseline { position: 4 };
    assert!(format!("{zero}").contains("position 4"));

    let mismatch = Error::LengthMismatch {
        baseline: 10,
        compared: 9,
    };
    let error_str = format!("{mismatch}");
    assert!(error_str.contains("baseline has 10"));
    assert!(error_str.contains("has 9"));
}

#[test]
fn test_non_contiguous_trials_error() {
    let error = Error::NonContiguousTrials {
        root: PathBuf::from("results"),
        missing: 2,
        expected: 3,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("trial directory 2 is missing"));
    assert!(error_str.contains("1..=3"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
    assert!(!error.is_skippable());
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_error_debug() {
    let error = Error::InvalidCatalog("duplicate name 'local'".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("InvalidCatalog"));
}
