// src/query.rs
//! Listing queries: free-text search, tag filter and pagination over a
//! loaded collection.

use serde::{Deserialize, Serialize};

use crate::episode::Episode;

pub const DEFAULT_PER_PAGE: usize = 10;

/// Case-insensitive substring match on title or description.
/// A blank query matches everything.
pub fn search<'a, I>(episodes: I, query: &str) -> Vec<&'a Episode>
where
    I: IntoIterator<Item = &'a Episode>,
{
    let needle = query.trim().to_lowercase();
    episodes
        .into_iter()
        .filter(|ep| needle.is_empty() || matches_text(ep, &needle))
        .collect()
}

fn matches_text(ep: &Episode, needle: &str) -> bool {
    ep.title.to_lowercase().contains(needle) || ep.description.to_lowercase().contains(needle)
}

/// Keep episodes carrying at least one of `selected`. No selection keeps all.
pub fn filter_by_tags<'a, I>(episodes: I, selected: &[String]) -> Vec<&'a Episode>
where
    I: IntoIterator<Item = &'a Episode>,
{
    episodes
        .into_iter()
        .filter(|ep| selected.is_empty() || selected.iter().any(|t| ep.has_tag(t)))
        .collect()
}

/// One page of results plus what a pager needs to render itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped into range.
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based position of the first item on this page, 0 when empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    /// 1-based position of the last item on this page, 0 when empty.
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `items` into pages of `per_page` and return page `page` (1-based).
/// Out-of-range pages are clamped; a `per_page` of 0 is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = (total + per_page - 1) / per_page;
    let page = page.clamp(1, total_pages.max(1));

    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages,
    }
}

/// State of the listing page: search text, selected tags and current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeQuery {
    search: String,
    tags: Vec<String>,
    page: usize,
    per_page: usize,
}

impl Default for EpisodeQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            tags: Vec::new(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl EpisodeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn selected_tags(&self) -> &[String] {
        &self.tags
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// New search text; goes back to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    /// Select the tag if unselected, otherwise unselect it; goes back to page 1.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
        self.page = 1;
    }

    pub fn clear_tags(&mut self) {
        self.tags.clear();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Search, then tag filter, then pagination.
    pub fn run<'a>(&self, episodes: &'a [Episode]) -> Page<&'a Episode> {
        let found = search(episodes, &self.search);
        let filtered = filter_by_tags(found, &self.tags);
        paginate(&filtered, self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(slug: &str, title: &str, description: &str, tags: &[&str]) -> Episode {
        Episode {
            id: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            image: None,
            publish_date: "2024-01-01".to_string(),
            duration: 60,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            transcript: None,
            audio_url: None,
            slug: slug.to_string(),
            featured: false,
            extra: Default::default(),
        }
    }

    #[test]
    fn search_is_case_insensitive_on_title_and_description() {
        let eps = vec![
            ep("a", "Storytelling Basics", "", &[]),
            ep("b", "Other", "all about STORY arcs", &[]),
            ep("c", "Design", "grids", &[]),
        ];
        let hits: Vec<_> = search(&eps, "  story ").iter().map(|e| e.slug.clone()).collect();
        assert_eq!(hits, vec!["a", "b"]);
        assert_eq!(search(&eps, "   ").len(), 3);
    }

    #[test]
    fn tag_filter_is_or() {
        let eps = vec![
            ep("a", "", "", &["design"]),
            ep("b", "", "", &["story"]),
            ep("c", "", "", &["misc"]),
        ];
        let sel = vec!["design".to_string(), "story".to_string()];
        assert_eq!(filter_by_tags(&eps, &sel).len(), 2);
        assert_eq!(filter_by_tags(&eps, &[]).len(), 3);
    }

    #[test]
    fn paginate_last_partial_page() {
        let items: Vec<u32> = (1..=23).collect();
        let p = paginate(&items, 3, 10);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.items, vec![21, 22, 23]);
        assert_eq!((p.first_index(), p.last_index(), p.total), (21, 23, 23));
        assert!(p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn paginate_clamps_and_handles_empty() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, 9, 2).page, 3);
        assert_eq!(paginate(&items, 0, 2).page, 1);

        let empty: Vec<u32> = Vec::new();
        let p = paginate(&empty, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.page, 1);
        assert!(p.is_empty());
        assert_eq!((p.first_index(), p.last_index()), (0, 0));
        assert!(!p.has_next());
    }

    #[test]
    fn query_state_resets_page() {
        let mut q = EpisodeQuery::new();
        q.set_page(4);
        q.toggle_tag("design");
        assert_eq!(q.page(), 1);
        assert_eq!(q.selected_tags().to_vec(), vec!["design".to_string()]);

        q.set_page(2);
        q.set_search("story");
        assert_eq!(q.page(), 1);

        q.toggle_tag("design");
        assert!(q.selected_tags().is_empty());
    }
}
