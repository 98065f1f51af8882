// Static feed table: source name -> bias metadata, category, URL and parse strategy.

use crate::config::NewsConfig;
use crate::models::Category;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// RSS 2.0 `<channel><item><title/><link/></item>`.
    Rss,
    /// Atom `<feed><entry><title/><link href=""/></entry>`.
    Atom,
    /// Reddit listing JSON (`/r/<sub>/top.json`).
    RedditJson,
}

#[derive(Debug, Clone, Copy)]
pub struct SourceSpec {
    pub name: &'static str,
    pub url: &'static str,
    /// Query parameter that receives `news.local_region`; the source is skipped
    /// while the region is empty.
    pub region_param: Option<&'static str>,
    pub bias_score: i8,
    pub bias_label: &'static str,
    pub category: Category,
    pub parse: ParseStrategy,
    pub timeout_secs: u64,
    pub max_items: usize,
}

pub const SOURCES: &[SourceSpec] = &[
    SourceSpec {
        name: "npr",
        url: "https://feeds.npr.org/1001/rss.xml",
        region_param: None,
        bias_score: -6,
        bias_label: "Lean Left",
        category: Category::National,
        parse: ParseStrategy::Rss,
        timeout_secs: 10,
        max_items: 10,
    },
    SourceSpec {
        name: "bbc",
        url: "https://feeds.bbci.co.uk/news/world/rss.xml",
        region_param: None,
        bias_score: -3,
        bias_label: "Center",
        category: Category::World,
        parse: ParseStrategy::Rss,
        timeout_secs: 10,
        max_items: 10,
    },
    SourceSpec {
        name: "guardian",
        url: "https://www.theguardian.com/world/rss",
        region_param: None,
        bias_score: -10,
        bias_label: "Left",
        category: Category::World,
        parse: ParseStrategy::Rss,
        timeout_secs: 10,
        max_items: 10,
    },
    SourceSpec {
        name: "wsj",
        url: "https://feeds.content.dowjones.io/public/rss/RSSWorldNews",
        region_param: None,
        bias_score: 6,
        bias_label: "Lean Right",
        category: Category::Business,
        parse: ParseStrategy::Rss,
        timeout_secs: 10,
        max_items: 10,
    },
    SourceSpec {
        name: "fox",
        url: "https://moxie.foxnews.com/google-publisher/politics.xml",
        region_param: None,
        bias_score: 14,
        bias_label: "Right",
        category: Category::Politics,
        parse: ParseStrategy::Rss,
        timeout_secs: 10,
        max_items: 10,
    },
    SourceSpec {
        name: "verge",
        url: "https://www.theverge.com/rss/index.xml",
        region_param: None,
        bias_score: -4,
        bias_label: "Lean Left",
        category: Category::Technology,
        parse: ParseStrategy::Atom,
        timeout_secs: 8,
        max_items: 10,
    },
    SourceSpec {
        name: "hackernews",
        url: "https://hnrss.org/frontpage",
        region_param: None,
        bias_score: 0,
        bias_label: "Center",
        category: Category::Technology,
        parse: ParseStrategy::Rss,
        timeout_secs: 5,
        max_items: 15,
    },
    SourceSpec {
        name: "reddit_worldnews",
        url: "https://www.reddit.com/r/worldnews/top.json?t=day&limit=15",
        region_param: None,
        bias_score: -2,
        bias_label: "Mixed",
        category: Category::World,
        parse: ParseStrategy::RedditJson,
        timeout_secs: 3,
        max_items: 15,
    },
    SourceSpec {
        name: "local",
        url: "https://news.google.com/rss/search?hl=en-US&gl=US&ceid=US:en",
        region_param: Some("q"),
        bias_score: 0,
        bias_label: "Aggregator",
        category: Category::Local,
        parse: ParseStrategy::Rss,
        timeout_secs: 15,
        max_items: 10,
    },
];

/// A table entry resolved against the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsSource {
    pub name: String,
    pub url: String,
    pub bias_score: i8,
    pub bias_label: String,
    pub category: Category,
    pub parse: ParseStrategy,
    pub timeout: Duration,
    pub max_items: usize,
}

impl NewsSource {
    fn from_spec(spec: &SourceSpec, url: String) -> Self {
        Self {
            name: spec.name.into(),
            url,
            bias_score: spec.bias_score,
            bias_label: spec.bias_label.into(),
            category: spec.category,
            parse: spec.parse,
            timeout: Duration::from_secs(spec.timeout_secs),
            max_items: spec.max_items,
        }
    }
}

/// Enabled sources in table order, with the local region substituted.
pub fn resolve_sources(table: &[SourceSpec], config: &NewsConfig) -> Vec<NewsSource> {
    let region = config.local_region.trim();
    let mut out = Vec::with_capacity(table.len());
    for spec in table {
        if !config.is_enabled(spec.name) {
            tracing::debug!(source = spec.name, "source disabled by config");
            continue;
        }
        let url = match spec.region_param {
            None => spec.url.to_string(),
            Some(_) if region.is_empty() => {
                tracing::debug!(source = spec.name, "no local region configured; skipping");
                continue;
            }
            Some(param) => match reqwest::Url::parse(spec.url) {
                Ok(mut url) => {
                    url.query_pairs_mut().append_pair(param, region);
                    url.to_string()
                }
                Err(e) => {
                    tracing::warn!(error = %e, source = spec.name, "invalid source URL; skipping");
                    continue;
                }
            },
        };
        out.push(NewsSource::from_spec(spec, url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BIAS_SCORE_MAX, BIAS_SCORE_MIN};
    use std::collections::HashSet;

    #[test]
    fn table_is_well_formed() {
        let mut names = HashSet::new();
        for s in SOURCES {
            assert!(names.insert(s.name), "duplicate source {}", s.name);
            assert!((BIAS_SCORE_MIN..=BIAS_SCORE_MAX).contains(&s.bias_score), "{}", s.name);
            assert!((3..=15).contains(&s.timeout_secs), "{}", s.name);
            assert!(s.max_items > 0);
            assert!(reqwest::Url::parse(s.url).is_ok(), "{}", s.name);
        }
    }

    #[test]
    fn region_is_query_encoded() {
        let config = NewsConfig {
            local_region: "Santa Fe, NM".into(),
            ..NewsConfig::default()
        };
        let sources = resolve_sources(SOURCES, &config);
        let local = sources.iter().find(|s| s.name == "local").unwrap();
        assert!(local.url.ends_with("&q=Santa+Fe%2C+NM"), "{}", local.url);
    }

    #[test]
    fn empty_region_and_disabled_sources_are_skipped() {
        let mut config = NewsConfig::default();
        config.sources.insert("fox".into(), false);
        let names: Vec<String> = resolve_sources(SOURCES, &config)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert!(!names.contains(&"fox".to_string()));
        assert!(!names.contains(&"local".to_string()));
        assert_eq!(names.len(), SOURCES.len() - 2);
    }
}
