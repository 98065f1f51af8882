// News aggregation: fetch every enabled source in turn, normalise headlines, then
// overwrite the news artifact and its metadata once at the end of the run.

mod fetch;
mod parse;
mod sources;

pub use fetch::{FeedFetcher, HttpFetcher};
pub use parse::{Headline, parse_feed};
pub use sources::{NewsSource, ParseStrategy, SOURCES, SourceSpec, resolve_sources};

use crate::error::{FetchError, PublishError};
use crate::models::{NewsItem, NewsMeta};
use crate::publisher::ArtifactPublisher;
use std::collections::BTreeMap;
use tracing::instrument;

/// Items from one run plus how many each successful source contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub items: Vec<NewsItem>,
    pub per_source: BTreeMap<String, usize>,
    /// Sources that were skipped this run.
    pub failed: Vec<String>,
}

pub struct NewsAggregator<F> {
    fetcher: F,
    sources: Vec<NewsSource>,
}

impl<F: FeedFetcher> NewsAggregator<F> {
    pub fn new(fetcher: F, sources: Vec<NewsSource>) -> Self {
        Self { fetcher, sources }
    }

    pub fn sources(&self) -> &[NewsSource] {
        &self.sources
    }

    /// Fetches sources sequentially. A failing source is skipped, never retried in the run.
    #[instrument(skip(self), fields(operation = "aggregate", sources = self.sources.len()))]
    pub async fn aggregate(&self) -> Aggregation {
        let timestamp = chrono::Local::now().to_rfc3339();
        let mut out = Aggregation::default();

        for source in &self.sources {
            match self.fetch_source(source).await {
                Ok(headlines) => {
                    let n = headlines.len();
                    out.items.extend(headlines.into_iter().map(|h| NewsItem {
                        source: source.name.clone(),
                        title: h.title,
                        url: h.url,
                        bias_score: source.bias_score,
                        bias_label: source.bias_label.clone(),
                        category: source.category,
                        timestamp: timestamp.clone(),
                    }));
                    out.per_source.insert(source.name.clone(), n);
                    tracing::debug!(source = %source.name, items = n, "source fetched");
                }
                Err(e) => {
                    tracing::warn!(error = %e, source = %source.name, "source skipped");
                    out.failed.push(source.name.clone());
                }
            }
        }
        out
    }

    async fn fetch_source(&self, source: &NewsSource) -> anyhow::Result<Vec<Headline>> {
        // the fetcher is trusted to honour the timeout, but bound it here as well
        let body = tokio::time::timeout(source.timeout, self.fetcher.fetch(&source.url, source.timeout))
            .await
            .map_err(|_| FetchError::Timeout(source.timeout))??;
        let mut headlines = parse_feed(&body, source.parse)?;
        anyhow::ensure!(!headlines.is_empty(), "feed contained no headlines");
        headlines.truncate(source.max_items);
        Ok(headlines)
    }

    /// One full run: aggregate, then overwrite the news array and metadata.
    pub async fn run(&self, publisher: &ArtifactPublisher) -> Result<NewsMeta, PublishError> {
        let aggregation = self.aggregate().await;
        let meta = NewsMeta {
            updated: chrono::Local::now().to_rfc3339(),
            count: aggregation.items.len(),
            sources: aggregation.per_source,
        };
        publisher.publish_news(&aggregation.items).await?;
        publisher.publish_news_meta(&meta).await?;
        tracing::info!(
            items = meta.count,
            sources_ok = meta.sources.len(),
            sources_failed = aggregation.failed.len(),
            "news artifact written"
        );
        Ok(meta)
    }
}
