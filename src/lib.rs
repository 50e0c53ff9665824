// src/lib.rs
// Public library surface for the site build and integration tests.

pub mod config;
pub mod duration;
pub mod episode;
pub mod query;
pub mod repository;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::config::SiteConfig;
pub use crate::episode::{Episode, RawEpisode};
pub use crate::query::{EpisodeQuery, Page};
pub use crate::repository::{
    EpisodeRepository, EpisodeSource, FileSource, InlineSource, LoadReport,
};
