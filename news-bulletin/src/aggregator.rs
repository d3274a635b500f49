use crate::parser::FeedParser;
use crate::traits::FeedFetcher;
use crate::types::{NewsItem, Result, SourceList};
use tracing::{info, warn};

/// Collects news items from a list of feeds.
pub struct NewsAggregator {
    fetcher: Box<dyn FeedFetcher>,
}

impl NewsAggregator {
    pub fn new(fetcher: Box<dyn FeedFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch every source in order and keep at most `limit` entries of each.
    ///
    /// A source that cannot be fetched or parsed is logged and skipped; the
    /// remaining sources are still collected.
    pub async fn collect(&self, sources: &[String], limit: usize) -> Vec<NewsItem> {
        let mut news = Vec::new();
        let mut failed = 0;

        for url in sources {
            match self.collect_one(url, limit).await {
                Ok(items) => {
                    info!("Collected {} items from {}", items.len(), url);
                    news.extend(items);
                }
                Err(e) => {
                    failed += 1;
                    warn!("Skipping feed {}: {}", url, e);
                }
            }
        }

        info!(
            "Collected {} news items from {}/{} feeds",
            news.len(),
            sources.len() - failed,
            sources.len()
        );
        news
    }

    pub async fn collect_sources(&self, sources: &SourceList) -> Vec<NewsItem> {
        self.collect(&sources.urls, sources.limit).await
    }

    async fn collect_one(&self, url: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let content = self.fetcher.fetch(url).await?;
        let parsed = FeedParser::parse_feed(&content)?;
        Ok(parsed.into_news_items(limit))
    }
}
