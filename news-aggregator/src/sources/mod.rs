pub mod defaults;

use crate::rss_utils::url::is_valid_rss_url;
use crate::types::{AggregatorError, FeedSource, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AggregatorError::InvalidSource(format!("missing name for {}", self.url)));
        }
        if !is_valid_rss_url(&self.url) {
            return Err(AggregatorError::InvalidSource(format!(
                "{} is not an http(s) URL ({})",
                self.url, self.name
            )));
        }
        Ok(())
    }
}

/// Parses `NAME=URL`. The split happens at the first `=`, so URLs with
/// query strings survive.
impl FromStr for FeedSource {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| AggregatorError::InvalidSource(format!("expected NAME=URL, got {:?}", s)))?;

        let source = FeedSource::new(name.trim(), url.trim());
        source.validate()?;
        Ok(source)
    }
}

/// Ordered mapping of source name to feed URL.
///
/// Iteration follows insertion order. Inserting an existing name replaces
/// its URL without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    sources: Vec<FeedSource>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        let name = name.into();
        let url = url.into();

        match self.sources.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                debug!("Replacing URL for source {}", name);
                existing.url = url;
            }
            None => self.sources.push(FeedSource { name, url }),
        }
    }

    pub fn push(&mut self, source: FeedSource) {
        self.insert(source.name, source.url);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Reads a JSON array of `{"name": ..., "url": ...}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<FeedSource> = serde_json::from_str(json)?;
        let mut list = Self::new();
        for entry in entries {
            entry.validate()?;
            list.push(entry);
        }
        Ok(list)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let list = Self::from_json_str(&json)?;
        info!("Loaded {} sources from {}", list.len(), path.display());
        Ok(list)
    }
}

impl FromIterator<FeedSource> for SourceList {
    fn from_iter<I: IntoIterator<Item = FeedSource>>(iter: I) -> Self {
        let mut list = Self::new();
        for source in iter {
            list.push(source);
        }
        list
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a FeedSource;
    type IntoIter = std::slice::Iter<'a, FeedSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}
