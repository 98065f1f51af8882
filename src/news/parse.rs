// Feed body -> headlines, one parser per strategy.

use super::sources::ParseStrategy;
use crate::error::ParseError;
use serde::Deserialize;

/// A title/link pair before normalisation into a `NewsItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub url: String,
}

pub fn parse_feed(body: &str, strategy: ParseStrategy) -> Result<Vec<Headline>, ParseError> {
    let raw = match strategy {
        ParseStrategy::Rss => parse_rss(body)?,
        ParseStrategy::Atom => parse_atom(body)?,
        ParseStrategy::RedditJson => parse_reddit(body)?,
    };
    Ok(raw.into_iter().filter_map(normalize).collect())
}

/// Collapses whitespace (including newlines) and drops entries without a title or URL.
fn normalize((title, url): (String, String)) -> Option<Headline> {
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let url = url.trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }
    Some(Headline { title, url })
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Namespace prefixes are not visible to serde, so `<media:title>` or `<atom:link>`
/// land in the same list as `<title>` / `<link>`. The first non-empty one wins.
fn first_text(texts: Vec<Text>) -> String {
    texts
        .into_iter()
        .map(|t| t.value)
        .find(|v| !v.trim().is_empty())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(rename = "title", default)]
    titles: Vec<Text>,
    #[serde(rename = "link", default)]
    links: Vec<Text>,
}

fn parse_rss(body: &str) -> Result<Vec<(String, String)>, ParseError> {
    let rss: Rss = quick_xml::de::from_str(body)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .map(|i| (first_text(i.titles), first_text(i.links)))
        .collect())
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "title", default)]
    titles: Vec<Text>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) is the article; other rels are feeds, images, etc.
    fn article_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| !l.href.is_empty() && matches!(l.rel.as_deref(), None | Some("alternate")))
            .map(|l| l.href.as_str())
    }
}

fn parse_atom(body: &str) -> Result<Vec<(String, String)>, ParseError> {
    let feed: AtomFeed = quick_xml::de::from_str(body)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|e| {
            let url = e.article_url()?.to_string();
            Some((first_text(e.titles), url))
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
}

fn parse_reddit(body: &str) -> Result<Vec<(String, String)>, ParseError> {
    let listing: RedditListing = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|c| {
            let post = c.data;
            let url = post
                .url
                .filter(|u| !u.is_empty())
                .or_else(|| post.permalink.map(|p| format!("https://www.reddit.com{}", p)))?;
            Some((post.title, url))
        })
        .collect())
}
