// tests/validate_document.rs
use episode_showcase::validate::{validate_document, validate_file, ViolationKind};
use std::fs;
use std::path::Path;

#[test]
fn clean_document_passes() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("site/data/episodes.json");
    let report = validate_file(&path).unwrap();
    assert_eq!(report.checked, 4);
    assert!(report.is_valid(), "{:?}", report.violations);
}

#[test]
fn one_line_per_violation() {
    let report = validate_document(
        r#"[
        {"id":"ok","title":"t","description":"d","publishDate":"2024-01-01T00:00:00Z","duration":"28:12","tags":[],"slug":"ok"},
        {"title":"t","description":"d","publishDate":"2024-01-01","duration":"abc","tags":{},"slug":"x"}
    ]"#,
    )
    .unwrap();
    assert_eq!(report.checked, 2);
    assert!(!report.is_valid());

    let lines: Vec<String> = report.violations.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            r#"Episode 2 (unknown): Missing required field "id""#.to_string(),
            r#"Episode 2 (unknown): Invalid duration format "abc". Expected HH:MM:SS or MM:SS format or a number."#.to_string(),
            r#"Episode 2 (unknown): "tags" field must be an array, got object"#.to_string(),
        ]
    );
}

#[test]
fn null_duration_is_present_but_invalid() {
    let report = validate_document(
        r#"[{"id":"n","title":"t","description":"d","publishDate":"2024-01-01","duration":null,"tags":[],"slug":"n"}]"#,
    )
    .unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(
        report.violations[0].kind,
        ViolationKind::InvalidDuration("null".into())
    );
}

#[test]
fn document_level_errors() {
    assert!(validate_document("{}").is_err());
    assert!(validate_document("not json").is_err());

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("episodes.json");
    let err = validate_file(&missing).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err:#}");

    fs::write(&missing, "[]").unwrap();
    assert!(validate_file(&missing).unwrap().is_valid());
}
