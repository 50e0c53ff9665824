// tests/repository_queries.rs
use episode_showcase::{repository, EpisodeRepository, InlineSource};
use std::path::Path;

fn repo(json: &str) -> EpisodeRepository {
    EpisodeRepository::new(InlineSource::new("test", json.to_string()))
}

#[test]
fn featured_is_newest_flagged() {
    let r = repo(
        r#"[
        {"id":"A","slug":"a","featured":true,"publishDate":"2024-01-01","duration":1},
        {"id":"B","slug":"b","featured":true,"publishDate":"2024-06-01","duration":1},
        {"id":"C","slug":"c","featured":false,"publishDate":"2024-12-01","duration":1}
    ]"#,
    );
    assert_eq!(r.find_featured().unwrap().unwrap().id, "B");
}

#[test]
fn featured_falls_back_to_first_record() {
    let r = repo(
        r#"[
        {"id":"C","slug":"c","publishDate":"2024-12-01","duration":1},
        {"id":"A","slug":"a","publishDate":"2024-01-01","duration":1},
        {"id":"B","slug":"b","publishDate":"2024-06-01","duration":1}
    ]"#,
    );
    assert_eq!(r.find_featured().unwrap().unwrap().id, "C");
}

#[test]
fn slug_lookup() {
    let r = repo(r#"[{"id":"1","slug":"hello","duration":"00:10"}]"#);
    let hit = r.find_by_slug("hello").unwrap().unwrap();
    assert_eq!(hit.duration, 10);
    assert!(r.find_by_slug("missing").unwrap().is_none());
    assert!(r.find_by_slug("HELLO").unwrap().is_none());
}

#[test]
fn shipped_sample_data_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("site/data/episodes.json");
    let r = EpisodeRepository::from_path(&path);

    let report = r.load_report().unwrap();
    assert!(report.warnings.is_empty());
    let eps = report.episodes;
    assert_eq!(eps.len(), 4);
    assert_eq!(
        eps.iter().map(|e| e.duration).collect::<Vec<_>>(),
        vec![1692, 2525, 3725, 3930]
    );

    assert_eq!(
        repository::featured(&eps).map(|e| e.slug.as_str()),
        Some("small-teams-big-ideas")
    );
    assert_eq!(
        r.all_tags().unwrap(),
        vec!["craft", "design", "ethics", "innovation", "interviews", "storytelling"]
    );
    assert_eq!(repository::slugs(&eps).len(), 4);
    assert_eq!(eps[3].formatted_duration(), "01:05:30");
}
