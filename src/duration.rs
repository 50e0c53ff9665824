// src/duration.rs
//! Duration codec: converts between author-facing timestamps (`H:MM:SS` or
//! `MM:SS`) and whole seconds.
//!
//! Parsing is lenient on purpose for the load path: [`parse`] never fails,
//! it logs a warning and yields `0` for anything it cannot read. Use
//! [`try_parse`] when the reason matters.

use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;

/// Duration as it appears in the data file, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(Number),
    Text(String),
    /// Any other JSON value (bool, null, array, object).
    Other(Value),
}

impl From<&str> for RawDuration {
    fn from(s: &str) -> Self {
        RawDuration::Text(s.to_string())
    }
}

impl From<String> for RawDuration {
    fn from(s: String) -> Self {
        RawDuration::Text(s)
    }
}

impl From<u64> for RawDuration {
    fn from(n: u64) -> Self {
        RawDuration::Seconds(Number::from(n))
    }
}

impl From<i64> for RawDuration {
    fn from(n: i64) -> Self {
        RawDuration::Seconds(Number::from(n))
    }
}

impl From<i32> for RawDuration {
    fn from(n: i32) -> Self {
        RawDuration::Seconds(Number::from(n))
    }
}

/// Why a duration could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    Missing,
    Empty,
    PartCount(usize),
    NotANumber(String),
    Negative,
    Overflow,
    UnsupportedType(&'static str),
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::Missing => write!(f, "duration is missing"),
            DurationError::Empty => write!(f, "duration is empty"),
            DurationError::PartCount(n) => {
                write!(f, "expected 2 or 3 ':'-separated parts, got {n}")
            }
            DurationError::NotANumber(part) => write!(f, "{part:?} is not a number"),
            DurationError::Negative => write!(f, "duration is negative"),
            DurationError::Overflow => write!(f, "duration is too large"),
            DurationError::UnsupportedType(kind) => write!(f, "unsupported duration type: {kind}"),
        }
    }
}

impl std::error::Error for DurationError {}

impl RawDuration {
    /// Strict conversion to seconds.
    pub fn to_seconds(&self) -> Result<u64, DurationError> {
        match self {
            RawDuration::Seconds(n) => number_to_seconds(n),
            RawDuration::Text(s) => parse_timestamp(s),
            RawDuration::Other(v) => Err(DurationError::UnsupportedType(json_kind(v))),
        }
    }
}

/// Strict parse. `None` stands for an absent field.
pub fn try_parse(raw: Option<&RawDuration>) -> Result<u64, DurationError> {
    match raw {
        Some(r) => r.to_seconds(),
        None => Err(DurationError::Missing),
    }
}

/// Lenient parse: numbers pass through, timestamps are decoded, anything
/// else logs a warning and becomes `0`.
pub fn parse(raw: impl Into<RawDuration>) -> u64 {
    let raw = raw.into();
    match raw.to_seconds() {
        Ok(secs) => secs,
        Err(e) => {
            tracing::warn!(input = ?raw, reason = %e, "could not parse duration, using 0");
            0
        }
    }
}

/// Render seconds as `MM:SS`, or `HH:MM:SS` once there is at least one hour.
pub fn format(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn number_to_seconds(n: &Number) -> Result<u64, DurationError> {
    if let Some(u) = n.as_u64() {
        return Ok(u);
    }
    if n.as_i64().is_some() {
        return Err(DurationError::Negative);
    }
    // fractional seconds are floored
    match n.as_f64() {
        Some(f) if f < 0.0 => Err(DurationError::Negative),
        Some(f) if f.is_finite() && f < u64::MAX as f64 => Ok(f.floor() as u64),
        _ => Err(DurationError::Overflow),
    }
}

fn parse_timestamp(s: &str) -> Result<u64, DurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    let parts: Vec<&str> = s.split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [h, m, sec] => (parse_part(h)?, parse_part(m)?, parse_part(sec)?),
        [m, sec] => (0, parse_part(m)?, parse_part(sec)?),
        other => return Err(DurationError::PartCount(other.len())),
    };

    h.checked_mul(3600)
        .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(sec))
        .ok_or(DurationError::Overflow)
}

fn parse_part(part: &str) -> Result<u64, DurationError> {
    let p = part.trim();
    if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::NotANumber(part.to_string()));
    }
    p.parse::<u64>().map_err(|_| DurationError::Overflow)
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
