use chrono::{Local, TimeZone};
use news_aggregator::render::{self, group_by_source, shorten_title, source_style};
use news_aggregator::{AggregationReport, NewsItem, SourceOutcome, SourceReport};

fn item(source: &str, title: &str) -> NewsItem {
    NewsItem::new(title, "https://example.com", source)
        .unwrap()
        .with_published(Some("03/07 09:05".to_string()))
}

fn rendered(f: impl FnOnce(&mut Vec<u8>) -> news_aggregator::Result<()>) -> String {
    let mut buffer = Vec::new();
    f(&mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_news_item_requires_title_and_source() {
    assert!(NewsItem::new("  ", "u", "S").is_none());
    assert!(NewsItem::new("Title", "u", " ").is_none());
    assert_eq!(NewsItem::new("  Title ", "u", "S").map(|i| i.title().to_string()), Some("Title".to_string()));
}

#[test]
fn test_group_by_first_appearance() {
    let items = vec![item("B", "b1"), item("A", "a1"), item("B", "b2")];
    let groups = group_by_source(&items);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "B");
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[1].0, "A");
}

#[test]
fn test_shorten_title() {
    let exact = "t".repeat(70);
    assert_eq!(shorten_title(&exact), exact);

    let long = "長".repeat(80);
    let short = shorten_title(&long);
    assert_eq!(short.chars().count(), 70);
    assert!(short.ends_with("..."));
}

#[test]
fn test_source_styles() {
    assert_eq!(source_style("Yahoo!経済").icon, "💼");
    assert_eq!(source_style("Yahoo!ニュース").icon, "📰");
    assert_eq!(source_style("ITメディア").icon, "💻");
    assert_eq!(source_style("Something else").icon, "📄");
}

#[test]
fn test_render_news_tables() {
    let items = vec![item("ITメディア", "First headline"), item("ITメディア", "Second headline")];
    let output = rendered(|out| render::render_news(out, &items));

    assert!(output.contains("ITメディア (2 items)"));
    assert!(output.contains(" 1. First headline"));
    assert!(output.contains(" 2. Second headline"));
    assert!(output.contains("03/07 09:05"));
}

#[test]
fn test_render_summary_counts() {
    let report = AggregationReport {
        sources: vec![
            SourceReport {
                name: "A".to_string(),
                url: "https://a.example/rss".to_string(),
                outcome: SourceOutcome::Fetched { items: vec![item("A", "one"), item("A", "two")], malformed: false },
            },
            SourceReport {
                name: "B".to_string(),
                url: "https://b.example/rss".to_string(),
                outcome: SourceOutcome::Failed { reason: "timeout".to_string() },
            },
        ],
    };
    let output = rendered(|out| render::render_summary(out, &report));

    assert!(output.contains("B (failed)"));
    assert!(output.contains("Total"));
    assert!(output.contains('2'));
    assert_eq!(report.item_count(), 2);
}

#[test]
fn test_render_footer_and_empty() {
    let now = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
    let footer = rendered(|out| render::render_footer(out, now));
    assert!(footer.contains("2024-03-07 09:05:00"));

    let empty = rendered(|out| render::render_empty(out));
    assert!(empty.contains("No news could be retrieved."));
    assert!(empty.contains("Check your internet connection."));
}

#[test]
fn test_render_json() {
    let items = vec![item("A", "Headline").with_summary(Some("Body".to_string()))];
    let output = rendered(|out| render::render_json(out, &items));

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value[0]["title"], "Headline");
    assert_eq!(value[0]["source"], "A");
    assert_eq!(value[0]["published"], "03/07 09:05");
    assert_eq!(value[0]["summary"], "Body");
}
