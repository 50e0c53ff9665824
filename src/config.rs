// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::query::{EpisodeQuery, DEFAULT_PER_PAGE};
use crate::repository::EpisodeRepository;

pub const ENV_CONFIG_PATH: &str = "EPISODES_CONFIG_PATH";
pub const ENV_DATA_PATH: &str = "EPISODES_DATA_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/site.toml";
pub const DEFAULT_DATA_PATH: &str = "site/data/episodes.json";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}
fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteConfig {
    /// Episodes JSON file. Relative paths resolve against the working dir.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Episodes per listing page.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            per_page: default_per_page(),
        }
    }
}

impl SiteConfig {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading site config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing site config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Resolve the config:
    /// 1) $EPISODES_CONFIG_PATH
    /// 2) config/site.toml
    /// 3) built-in defaults
    ///
    /// $EPISODES_DATA_PATH then overrides `data_path` in every case.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let toml_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if toml_p.exists() {
                Self::load_from(&toml_p)?
            } else {
                Self::default()
            }
        };

        if let Ok(p) = std::env::var(ENV_DATA_PATH) {
            if !p.trim().is_empty() {
                cfg.data_path = PathBuf::from(p.trim());
            }
        }
        Ok(cfg)
    }

    pub fn repository(&self) -> EpisodeRepository {
        EpisodeRepository::from_path(&self.data_path)
    }

    pub fn query(&self) -> EpisodeQuery {
        EpisodeQuery::new().with_per_page(self.per_page)
    }

    fn sanitize(&mut self) {
        if self.per_page == 0 {
            self.per_page = default_per_page();
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<SiteConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).map_err(Into::into);
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        // unknown extension: give JSON a chance before failing
        Err(toml_err) if hint_ext != "toml" => {
            serde_json::from_str(s).map_err(|_| anyhow!(toml_err))
        }
        Err(e) => Err(e.into()),
    }
}
