//! Helpers shared by the parser, the aggregator and the renderer.

/// URL utilities for feed endpoints
pub mod url {
    use url::Url;

    /// Validate RSS feed URL format
    pub fn is_valid_rss_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}

/// Time formatting for feed entries
pub mod time {
    use crate::types::PublishedTime;

    pub const DISPLAY_FORMAT: &str = "%m/%d %H:%M";

    /// `MM/DD HH:MM`, or `None` when the fields do not form a real datetime.
    pub fn format_published(published: &PublishedTime) -> Option<String> {
        published
            .to_datetime()
            .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
    }
}

/// Text cleanup for titles and summaries
pub mod text {
    use once_cell::sync::Lazy;
    use regex::Regex;

    pub const ELLIPSIS: &str = "...";

    static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

    /// Drop anything that looks like a markup tag. Entities are left as-is.
    pub fn strip_tags(html: &str) -> String {
        TAG.replace_all(html, "").into_owned()
    }

    /// Keep at most `max_chars` characters, appending `...` when cut.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    }

    /// Tag-stripped, trimmed and truncated summary. Markup-only input
    /// yields an empty string.
    pub fn clean_summary(raw: &str, max_chars: usize) -> String {
        truncate_chars(strip_tags(raw).trim(), max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublishedTime;

    #[test]
    fn strips_tags_but_not_entities() {
        assert_eq!(text::strip_tags("<p>Tom &amp; <b>Jerry</b></p>"), "Tom &amp; Jerry");
        assert_eq!(text::strip_tags("a < b"), "a < b");
    }

    #[test]
    fn truncates_by_characters() {
        let japanese = "速".repeat(120);
        let cut = text::truncate_chars(&japanese, 100);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));

        assert_eq!(text::truncate_chars("short", 100), "short");
    }

    #[test]
    fn markup_only_summary_is_empty() {
        assert_eq!(text::clean_summary("  <br/>  ", 100), "");
        assert_eq!(text::clean_summary("<img src='a'/>", 100), "");
        assert_eq!(text::clean_summary(" <i>hi</i> ", 100), "hi");
    }

    #[test]
    fn formats_and_rejects_published_times() {
        let ok = PublishedTime::new(2024, 3, 7, 9, 5, 0);
        assert_eq!(time::format_published(&ok), Some("03/07 09:05".to_string()));

        let bad = PublishedTime::new(2024, 2, 30, 9, 5, 0);
        assert_eq!(time::format_published(&bad), None);
    }

    #[test]
    fn url_checks() {
        assert!(url::is_valid_rss_url("https://news.yahoo.co.jp/rss/topics/top-picks.xml"));
        assert!(!url::is_valid_rss_url("ftp://example.com/feed"));
        assert!(!url::is_valid_rss_url("not a url"));
    }
}
