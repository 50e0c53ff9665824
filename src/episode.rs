// src/episode.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::duration::{self, DurationError, RawDuration};

/// One record exactly as it sits in the data file.
///
/// Nothing here fails on a badly typed field: scalars are coerced, anything
/// unusable falls back to an empty value. Only `duration` is interpreted.
/// Keys we don't know about are kept in `extra`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEpisode {
    #[serde(default, deserialize_with = "string_or_default")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub publish_date: String,
    #[serde(default)]
    pub duration: Option<RawDuration>,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub transcript: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "truthy")]
    pub featured: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A normalized episode. `duration` is always whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub publish_date: String,
    pub duration: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEpisode {
    /// Convert to an [`Episode`]. A duration that can't be read becomes `0`
    /// and the reason is handed back to the caller for reporting.
    pub fn normalize(self) -> (Episode, Option<DurationError>) {
        let (seconds, problem) = match duration::try_parse(self.duration.as_ref()) {
            Ok(s) => (s, None),
            Err(e) => (0, Some(e)),
        };

        let ep = Episode {
            id: self.id,
            title: self.title,
            description: self.description,
            image: self.image,
            publish_date: self.publish_date,
            duration: seconds,
            tags: self.tags,
            transcript: self.transcript,
            audio_url: self.audio_url,
            slug: self.slug,
            featured: self.featured.unwrap_or(false),
            extra: self.extra,
        };
        (ep, problem)
    }
}

impl Episode {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_publish_date(&self.publish_date)
    }

    pub fn formatted_duration(&self) -> String {
        duration::format(self.duration)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Parse a publish date. Accepts RFC 3339, RFC 2822, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) or a bare `YYYY-MM-DD`.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn scalar_to_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

// JS truthiness: `"yes"` and `1` count as featured, `0`, `""` and `null` don't.
fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    })
}

// `tags` that isn't an array contributes nothing; non-string entries are dropped.
fn tags_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(match v {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|t| match t {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
