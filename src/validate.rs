// src/validate.rs
//! Offline schema check for the episodes data file.
//!
//! This is not part of the load path: the repository never calls it. It is
//! run ahead of deployment (see the `validate-episodes` binary) and reports
//! every problem it finds instead of stopping at the first.

use anyhow::{bail, Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::duration::json_kind;
use crate::episode::parse_publish_date;

pub const REQUIRED_FIELDS: [&str; 7] = [
    "id",
    "title",
    "description",
    "publishDate",
    "duration",
    "tags",
    "slug",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    NotAnObject(&'static str),
    MissingField(&'static str),
    InvalidDuration(String),
    TagsNotArray(&'static str),
    InvalidPublishDate(String),
}

/// One problem with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based position in the document.
    pub position: usize,
    /// The record's `id`, or "unknown".
    pub id: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Episode {} ({}): ", self.position, self.id)?;
        match &self.kind {
            ViolationKind::NotAnObject(kind) => write!(f, "record must be an object, got {kind}"),
            ViolationKind::MissingField(field) => write!(f, "Missing required field \"{field}\""),
            ViolationKind::InvalidDuration(raw) => write!(
                f,
                "Invalid duration format \"{raw}\". Expected HH:MM:SS or MM:SS format or a number."
            ),
            ViolationKind::TagsNotArray(kind) => {
                write!(f, "\"tags\" field must be an array, got {kind}")
            }
            ViolationKind::InvalidPublishDate(raw) => {
                write!(f, "Invalid publishDate \"{raw}\". Expected ISO 8601 format.")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Number of records examined.
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validate a file. A missing file, invalid JSON or a non-array root is an
/// error rather than a violation.
pub fn validate_file(path: &Path) -> Result<Report> {
    if !path.exists() {
        bail!("episodes file not found: {}", path.display());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading episodes from {}", path.display()))?;
    validate_document(&text)
}

pub fn validate_document(json: &str) -> Result<Report> {
    let root: Value = serde_json::from_str(json).context("episodes data is not valid JSON")?;
    let Value::Array(items) = &root else {
        bail!("episodes data must be an array");
    };
    Ok(Report {
        checked: items.len(),
        violations: validate_episodes(items),
    })
}

pub fn validate_episodes(items: &[Value]) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let position = i + 1;
        match item {
            Value::Object(record) => check_record(position, record, &mut out),
            other => out.push(Violation {
                position,
                id: "unknown".to_string(),
                kind: ViolationKind::NotAnObject(json_kind(other)),
            }),
        }
    }
    out
}

fn check_record(position: usize, record: &Map<String, Value>, out: &mut Vec<Violation>) {
    let id = record_id(record);
    let mut push = |kind| {
        out.push(Violation {
            position,
            id: id.clone(),
            kind,
        })
    };

    for field in REQUIRED_FIELDS {
        if !record.contains_key(field) {
            push(ViolationKind::MissingField(field));
        }
    }

    if let Some(d) = record.get("duration") {
        if !is_valid_duration(d) {
            push(ViolationKind::InvalidDuration(display_value(d)));
        }
    }

    if let Some(tags) = record.get("tags") {
        if !tags.is_array() {
            push(ViolationKind::TagsNotArray(json_kind(tags)));
        }
    }

    if let Some(date) = record.get("publishDate") {
        if !is_valid_date(date) {
            push(ViolationKind::InvalidPublishDate(display_value(date)));
        }
    }
}

/// A number, or a string of 2–3 `:`-separated groups of 1–2 digits.
pub fn is_valid_duration(v: &Value) -> bool {
    static RE_GROUP: OnceCell<Regex> = OnceCell::new();
    let re = RE_GROUP.get_or_init(|| Regex::new(r"^[0-9]{1,2}$").expect("duration group regex"));

    match v {
        Value::Number(_) => true,
        Value::String(s) => {
            let parts: Vec<&str> = s.split(':').collect();
            (2..=3).contains(&parts.len()) && parts.iter().all(|p| re.is_match(p))
        }
        _ => false,
    }
}

// Numbers, booleans and null coerce to epoch-based timestamps and pass;
// strings must parse as a date; arrays and objects never do.
fn is_valid_date(v: &Value) -> bool {
    match v {
        Value::String(s) => parse_publish_date(s).is_some(),
        Value::Number(_) | Value::Bool(_) | Value::Null => true,
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn record_id(record: &Map<String, Value>) -> String {
    match record.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "unknown".to_string(),
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_shapes() {
        assert!(is_valid_duration(&json!(1692)));
        assert!(is_valid_duration(&json!(12.5)));
        assert!(is_valid_duration(&json!("00:28:12")));
        assert!(is_valid_duration(&json!("5:09")));
        assert!(!is_valid_duration(&json!("100:00")));
        assert!(!is_valid_duration(&json!("1:2:3:4")));
        assert!(!is_valid_duration(&json!("12")));
        assert!(!is_valid_duration(&json!("aa:bb")));
        assert!(!is_valid_duration(&json!(null)));
    }

    #[test]
    fn reports_every_violation_of_a_record() {
        let items = vec![json!({
            "id": "ep-9",
            "title": "t",
            "publishDate": "yesterday",
            "duration": "1:2:3:4",
            "tags": "design"
        })];
        let v = validate_episodes(&items);
        let kinds: Vec<_> = v.iter().map(|x| x.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::MissingField("description"),
                ViolationKind::MissingField("slug"),
                ViolationKind::InvalidDuration("1:2:3:4".into()),
                ViolationKind::TagsNotArray("string"),
                ViolationKind::InvalidPublishDate("yesterday".into()),
            ]
        );
        assert!(v.iter().all(|x| x.position == 1 && x.id == "ep-9"));
    }

    #[test]
    fn publish_date_coercions() {
        assert!(is_valid_date(&json!("2024-01-01")));
        assert!(is_valid_date(&json!(1_704_067_200_000u64)));
        assert!(is_valid_date(&json!(null)));
        assert!(is_valid_date(&json!(true)));
        assert!(!is_valid_date(&json!("yesterday")));
        assert!(!is_valid_date(&json!({})));
    }

    #[test]
    fn message_format() {
        let v = Violation {
            position: 2,
            id: "unknown".into(),
            kind: ViolationKind::MissingField("slug"),
        };
        assert_eq!(v.to_string(), r#"Episode 2 (unknown): Missing required field "slug""#);
    }

    #[test]
    fn non_object_record_is_a_violation() {
        let v = validate_episodes(&[json!(5)]);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::NotAnObject("number"));
    }
}
