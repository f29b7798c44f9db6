use crate::types::{AggregatorError, FeedDocument, PublishedTime, RawEntry, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use feed_rs::parser;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

static RAW_SECTIONS: [(&str, &str); 2] = [("<![CDATA[", "]]>"), ("<!--", "-->")];

/// Turns raw feed bytes (RSS, Atom or JSON Feed) into a [`FeedDocument`].
#[derive(Debug, Default, Clone)]
pub struct FeedParser;

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses `content`. Bodies with junk before the first tag or stray
    /// ampersands are repaired up front, since feed-rs accepts them but
    /// loses text. Anything the strict parse rejects gets the same repair,
    /// and truncated documents are cut back to their last complete entry.
    /// A document obtained through repair carries the reason as its
    /// malformation.
    pub fn parse(&self, content: &[u8]) -> Result<FeedDocument> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let decoded = String::from_utf8_lossy(content);
        let reason = match Self::find_defect(&decoded) {
            Some(defect) => defect,
            None => match parser::parse(content) {
                Ok(feed) => {
                    let document = Self::convert(feed);
                    info!("Parsed feed with {} entries", document.entries.len());
                    return Ok(document);
                }
                Err(e) => e.to_string(),
            },
        };

        if !Self::looks_like_feed(&decoded) {
            return Err(AggregatorError::Parse(format!("Not a feed document: {}", reason)));
        }

        debug!("Feed needs repair ({})", reason);
        let repaired = Self::repair(content);

        let feed = match parser::parse(repaired.as_bytes()) {
            Ok(feed) => feed,
            Err(e) => {
                let closed = Self::close_truncated(&repaired)
                    .ok_or_else(|| AggregatorError::Parse(format!("Failed to parse feed: {}", reason)))?;
                debug!("Repaired feed still invalid ({}), closing it after the last entry", e);
                parser::parse(closed.as_bytes())
                    .map_err(|_| AggregatorError::Parse(format!("Failed to parse feed: {}", reason)))?
            }
        };

        warn!("Recovered malformed feed: {}", reason);
        let document = Self::convert(feed).with_malformation(reason);
        info!("Parsed repaired feed with {} entries", document.entries.len());
        Ok(document)
    }

    /// Best-effort cleanup of common feed breakage: invalid UTF-8, junk
    /// before the first tag and bare ampersands outside CDATA and comments.
    pub fn repair(content: &[u8]) -> String {
        let decoded = String::from_utf8_lossy(content);
        let body = match decoded.find('<') {
            Some(start) => &decoded[start..],
            None => decoded.as_ref(),
        };

        let mut repaired = String::with_capacity(body.len());
        let mut copied = 0;
        for at in Self::bare_ampersands(body) {
            repaired.push_str(&body[copied..=at]);
            repaired.push_str("amp;");
            copied = at + 1;
        }
        repaired.push_str(&body[copied..]);
        repaired
    }

    /// Problems feed-rs would swallow silently. Only markup bodies are checked.
    fn find_defect(decoded: &str) -> Option<String> {
        if !Self::looks_like_feed(decoded) {
            return None;
        }

        let start = decoded.find('<')?;
        let prefix = decoded[..start].trim_start_matches('\u{feff}').trim();
        if !prefix.is_empty() {
            return Some(format!("{} bytes of junk before the first tag", start));
        }

        Self::bare_ampersands(&decoded[start..])
            .first()
            .map(|at| format!("unescaped '&' at byte {}", start + at))
    }

    /// Byte offsets of `&` that do not start an entity, skipping CDATA
    /// sections and comments.
    fn bare_ampersands(body: &str) -> Vec<usize> {
        let mut positions = Vec::new();
        let mut index = 0;

        while let Some(offset) = body[index..].find(|c: char| c == '&' || c == '<') {
            let at = index + offset;
            let rest = &body[at..];

            if let Some(&(_, close)) = RAW_SECTIONS.iter().find(|(open, _)| rest.starts_with(*open)) {
                match rest.find(close) {
                    Some(end) => {
                        index = at + end + close.len();
                        continue;
                    }
                    None => break,
                }
            }

            if rest.starts_with('&') && !ENTITY.is_match(rest) {
                positions.push(at);
            }
            index = at + 1;
        }
        positions
    }

    /// Cuts a truncated document after its last complete item or entry and
    /// appends the closing tags of the root element.
    fn close_truncated(body: &str) -> Option<String> {
        let lower = body.to_ascii_lowercase();

        let (last_entry, closing) = if lower.contains("<rss") {
            ("</item>", "</channel></rss>")
        } else if lower.contains("<rdf:rdf") {
            ("</item>", "</rdf:RDF>")
        } else if lower.contains("<feed") {
            ("</entry>", "</feed>")
        } else {
            return None;
        };

        let end = lower.rfind(last_entry)? + last_entry.len();
        Some(format!("{}{}", &body[..end], closing))
    }

    fn convert(feed: feed_rs::model::Feed) -> FeedDocument {
        let entries = feed.entries.into_iter().map(Self::convert_entry).collect();

        FeedDocument {
            title: feed.title.map(|t| t.content),
            entries,
            malformation: None,
        }
    }

    fn convert_entry(entry: feed_rs::model::Entry) -> RawEntry {
        let title = entry.title.map(|t| t.content);
        let link = entry.links.into_iter().next().map(|l| l.href);

        // Feeds without a publish date often still carry an update date.
        let published = entry.published.or(entry.updated).map(Self::published_time);

        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        RawEntry {
            title,
            link,
            published,
            summary,
        }
    }

    fn published_time(dt: DateTime<Utc>) -> PublishedTime {
        PublishedTime::new(dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second())
    }

    /// Cheap sniff for RSS/Atom markers, used to skip repair on HTML error
    /// pages and other non-feed bodies.
    pub fn looks_like_feed(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
    }
}
