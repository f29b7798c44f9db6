use news_aggregator::{FeedSource, SourceList};
use std::io::Write as _;

fn url_of<'a>(sources: &'a SourceList, name: &str) -> Option<&'a str> {
    sources.iter().find(|s| s.name == name).map(|s| s.url.as_str())
}

#[test]
fn test_insertion_order_is_kept() {
    let mut sources = SourceList::new();
    sources.insert("Zeta", "https://z.example/rss");
    sources.insert("Alpha", "https://a.example/rss");
    sources.insert("Mid", "https://m.example/rss");

    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
}

#[test]
fn test_reinserting_a_name_replaces_in_place() {
    let mut sources = SourceList::new();
    sources.insert("A", "https://a.example/old");
    sources.insert("B", "https://b.example/rss");
    sources.insert("A", "https://a.example/new");

    assert_eq!(sources.len(), 2);
    assert_eq!(url_of(&sources, "A"), Some("https://a.example/new"));
    assert_eq!(sources.iter().next().map(|s| s.name.as_str()), Some("A"));
}

#[test]
fn test_defaults() {
    let sources = SourceList::defaults();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();

    assert_eq!(names, vec!["Yahoo!ニュース", "ITメディア", "Yahoo!経済"]);
    assert!(sources.iter().all(|s| s.url.starts_with("https://")));
}

#[test]
fn test_parse_name_equals_url() {
    let source: FeedSource = "Hacker News=https://hnrss.org/frontpage?points=100".parse().unwrap();
    assert_eq!(source, FeedSource::new("Hacker News", "https://hnrss.org/frontpage?points=100"));

    assert!("no-separator".parse::<FeedSource>().is_err());
    assert!("=https://example.com/rss".parse::<FeedSource>().is_err());
    assert!("Name=ftp://example.com/rss".parse::<FeedSource>().is_err());
    assert!("Name=".parse::<FeedSource>().is_err());
}

#[test]
fn test_from_json() {
    let json = r#"[
        {"name": "B", "url": "https://b.example/rss"},
        {"name": "A", "url": "https://a.example/rss"}
    ]"#;
    let sources = SourceList::from_json_str(json).unwrap();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);

    assert!(SourceList::from_json_str(r#"[{"name": "bad", "url": "nope"}]"#).is_err());
    assert!(SourceList::from_json_str("{").is_err());
}

#[test]
fn test_from_json_file() {
    let path = std::env::temp_dir().join(format!("news-sources-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, r#"[{{"name": "Only", "url": "https://only.example/rss"}}]"#).unwrap();
    drop(file);

    let sources = SourceList::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(sources.len(), 1);
    assert_eq!(url_of(&sources, "Only"), Some("https://only.example/rss"));
    assert!(SourceList::from_json_file(path.with_extension("missing")).is_err());
}

#[test]
fn test_collect_into_source_list() {
    let sources: SourceList = vec![
        FeedSource::new("A", "https://a.example/1"),
        FeedSource::new("A", "https://a.example/2"),
    ]
    .into_iter()
    .collect();

    assert_eq!(sources.len(), 1);
    assert_eq!(url_of(&sources, "A"), Some("https://a.example/2"));
}
