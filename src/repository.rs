// src/repository.rs
//! Episode repository: reads the JSON document through an injected
//! [`EpisodeSource`], normalizes durations and answers the read-only queries
//! the site needs (by slug, featured, tag index).
//!
//! Every `EpisodeRepository` call re-reads the source. Nothing is cached, so
//! a caller that wants one read per build should call [`EpisodeRepository::load_all`]
//! once and use the slice helpers ([`by_slug`], [`featured`], [`collect_tags`]).

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::duration::{json_kind, DurationError};
use crate::episode::{Episode, RawEpisode};

/// Read access to the backing JSON document.
///
/// Holding one of these is what allows loading; there is no ambient check
/// for file-system access.
pub trait EpisodeSource: Send + Sync {
    fn read(&self) -> Result<String>;
    /// Human-readable origin, used in logs and error context.
    fn describe(&self) -> String;
}

/// The data file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EpisodeSource for FileSource {
    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading episodes from {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document held in memory (embedded data, fixtures).
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    json: String,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json: json.into(),
        }
    }
}

impl EpisodeSource for InlineSource {
    fn read(&self) -> Result<String> {
        Ok(self.json.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A record whose duration could not be read and was stored as `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationWarning {
    /// 0-based position in the document.
    pub index: usize,
    pub id: String,
    pub error: DurationError,
}

/// Result of one load: the episodes plus the per-record diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub episodes: Vec<Episode>,
    pub warnings: Vec<DurationWarning>,
}

pub struct EpisodeRepository {
    source: Box<dyn EpisodeSource>,
}

impl EpisodeRepository {
    pub fn new(source: impl EpisodeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileSource::new(path))
    }

    pub fn source(&self) -> &dyn EpisodeSource {
        self.source.as_ref()
    }

    /// Load and normalize, keeping the duration diagnostics.
    pub fn load_report(&self) -> Result<LoadReport> {
        let origin = self.source.describe();
        let text = self.source.read()?;
        let raw = parse_document(&text).with_context(|| format!("loading episodes from {origin}"))?;
        let report = normalize(raw);
        debug!(
            source = %origin,
            episodes = report.episodes.len(),
            warnings = report.warnings.len(),
            "episodes loaded"
        );
        Ok(report)
    }

    /// All episodes in document order with durations in seconds.
    pub fn load_all(&self) -> Result<Vec<Episode>> {
        Ok(self.load_report()?.episodes)
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Episode>> {
        let episodes = self.load_all()?;
        Ok(by_slug(&episodes, slug).cloned())
    }

    pub fn find_featured(&self) -> Result<Option<Episode>> {
        let episodes = self.load_all()?;
        Ok(featured(&episodes).cloned())
    }

    pub fn all_tags(&self) -> Result<Vec<String>> {
        let episodes = self.load_all()?;
        Ok(collect_tags(&episodes))
    }
}

/// Parse the document into raw records. The root must be an array.
pub fn parse_document(json: &str) -> Result<Vec<RawEpisode>> {
    let root: Value = serde_json::from_str(json).context("episodes data is not valid JSON")?;
    let items = match root {
        Value::Array(items) => items,
        other => bail!("episodes data must be an array, got {}", json_kind(&other)),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(_) => serde_json::from_value::<RawEpisode>(item)
                .with_context(|| format!("episode {} is not a valid record", i + 1)),
            // a non-object element loads as an empty record
            other => {
                warn!(index = i, kind = json_kind(&other), "episode is not an object");
                Ok(RawEpisode::default())
            }
        })
        .collect()
}

/// Normalize raw records; bad durations become `0` and are reported.
pub fn normalize(raw: Vec<RawEpisode>) -> LoadReport {
    let mut report = LoadReport {
        episodes: Vec::with_capacity(raw.len()),
        warnings: Vec::new(),
    };

    for (index, r) in raw.into_iter().enumerate() {
        let (ep, problem) = r.normalize();
        if let Some(error) = problem {
            warn!(index, id = %ep.id, slug = %ep.slug, reason = %error, "invalid duration, using 0");
            report.warnings.push(DurationWarning {
                index,
                id: ep.id.clone(),
                error,
            });
        }
        report.episodes.push(ep);
    }

    report
}

/// First episode whose slug matches exactly.
pub fn by_slug<'a>(episodes: &'a [Episode], slug: &str) -> Option<&'a Episode> {
    episodes.iter().find(|ep| ep.slug == slug)
}

/// Newest featured episode; falls back to the first episode when none is
/// flagged. Unparseable publish dates sort as the oldest.
pub fn featured(episodes: &[Episode]) -> Option<&Episode> {
    let mut flagged: Vec<&Episode> = episodes.iter().filter(|ep| ep.featured).collect();
    // stable: equal dates keep document order
    flagged.sort_by_cached_key(|ep| Reverse(ep.published_at()));
    flagged.first().copied().or_else(|| episodes.first())
}

/// Every tag used, deduplicated and sorted.
pub fn collect_tags(episodes: &[Episode]) -> Vec<String> {
    episodes
        .iter()
        .flat_map(|ep| ep.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Slugs in document order, e.g. for enumerating detail routes.
pub fn slugs(episodes: &[Episode]) -> Vec<&str> {
    episodes.iter().map(|ep| ep.slug.as_str()).collect()
}
