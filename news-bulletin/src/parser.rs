use crate::types::{BulletinError, NewsItem, Result};
use feed_rs::parser;
use tracing::debug;

/// Entry title used when a feed entry has none.
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: String,
    pub summary: Option<String>,
}

impl ParsedFeed {
    /// First `limit` entries as news items, in feed order.
    pub fn into_news_items(self, limit: usize) -> Vec<NewsItem> {
        let source = self.title;
        self.entries
            .into_iter()
            .take(limit)
            .map(|entry| NewsItem::new(entry.title, entry.summary, source.clone()))
            .collect()
    }
}

/// Stateless RSS/Atom parser.
pub struct FeedParser;

impl FeedParser {
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| BulletinError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| ParsedEntry {
                title: entry
                    .title
                    .map(|t| t.content.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string()),
                summary: entry.summary.map(|s| s.content.trim().to_string()),
            })
            .collect::<Vec<_>>();

        debug!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed { title, entries })
    }
}
