//! RSS 2.0 / Atom feed adapter.
//!
//! Unlike the API adapters, feeds are not filtered on title/description by
//! default. Two opt-in policies exist ([`RssPolicy`]): the API-style
//! presence filter and a case-insensitive keyword filter over title and
//! summary.

use crate::config::{Feed, RssPolicy};
use crate::error::SourceError;
use crate::models::Article;
use crate::utils::{parse_timestamp, strip_html};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info, instrument};

/// One configured feed plus the policies applied to its entries.
#[derive(Debug, Clone)]
pub struct RssFeed {
    feed: Feed,
    policy: RssPolicy,
    keyword: Option<String>,
}

/// A feed entry before normalization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
}

/// The parts of a feed document this adapter reads.
#[derive(Debug, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
}

impl RssFeed {
    pub fn new(feed: Feed, policy: RssPolicy, keyword: Option<String>) -> Self {
        Self {
            feed,
            policy,
            keyword: keyword
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        }
    }

    /// Configured name, else the feed URL.
    pub fn label(&self) -> &str {
        self.feed.name.as_deref().unwrap_or(&self.feed.url)
    }

    #[instrument(level = "info", skip_all, fields(feed = %self.feed.url))]
    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<Article>, SourceError> {
        let body = http
            .get(&self.feed.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let parsed = parse_feed(&body)?;
        let total = parsed.items.len();
        let articles = self.to_articles(parsed, Utc::now());
        info!(total, kept = articles.len(), "Fetched feed entries");
        Ok(articles)
    }

    fn matches_keyword(&self, item: &FeedItem) -> bool {
        match &self.keyword {
            None => true,
            Some(_) if !self.policy.keyword_filter => true,
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                item.title.to_lowercase().contains(&needle)
                    || item.summary.to_lowercase().contains(&needle)
            }
        }
    }

    /// Normalize parsed entries. Missing or unparsable dates become `now`.
    pub fn to_articles(&self, parsed: ParsedFeed, now: DateTime<Utc>) -> Vec<Article> {
        let source = self
            .feed
            .name
            .clone()
            .or(parsed.title)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "RSS".to_string());

        parsed
            .items
            .into_iter()
            .filter(|item| self.matches_keyword(item))
            .filter(|item| {
                !self.policy.require_title_and_description
                    || (!item.title.trim().is_empty() && !item.summary.trim().is_empty())
            })
            .filter_map(|item| {
                if item.link.trim().is_empty() {
                    debug!(title = %item.title, "Skipping feed entry without a link");
                    return None;
                }
                let published_at = item
                    .published
                    .filter(|p| parse_timestamp(p).is_some())
                    .unwrap_or_else(|| now.to_rfc3339());
                let content = (!item.summary.is_empty()).then(|| item.summary.clone());
                Some(Article {
                    title: item.title,
                    description: item.summary,
                    content,
                    url: item.link,
                    source: source.clone(),
                    published_at: Some(published_at),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Summary,
    Content,
    Published,
    Updated,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" | b"summary" => Some(Field::Summary),
            b"content:encoded" | b"content" => Some(Field::Content),
            b"pubDate" | b"published" | b"dc:date" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    summary: String,
    content: String,
    published: String,
    updated: String,
}

impl ItemBuilder {
    fn buffer(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        }
    }

    fn push(&mut self, field: Field, text: &str) {
        let buf = self.buffer(field);
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(text);
    }

    fn build(self) -> FeedItem {
        let summary = if self.summary.trim().is_empty() {
            strip_html(&self.content)
        } else {
            strip_html(&self.summary)
        };
        let published = [self.published, self.updated]
            .into_iter()
            .map(|p| p.trim().to_string())
            .find(|p| !p.is_empty());
        FeedItem {
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            summary,
            published,
        }
    }
}

/// `href` of an Atom `<link>`, when it points at the entry itself.
fn atom_href(e: &BytesStart<'_>) -> Option<String> {
    let href = e.try_get_attribute("href").ok().flatten()?;
    let rel = e
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|r| r.unescape_value().ok().map(|v| v.into_owned()));
    if rel.as_deref().is_some_and(|r| r != "alternate") {
        return None;
    }
    href.unescape_value().ok().map(|v| v.into_owned())
}

/// Parse an RSS 2.0 or Atom document.
///
/// Collects `<item>`/`<entry>` children (title, link, description/summary
/// with `content` as fallback, pubDate/published/dc:date with `updated` as
/// fallback) and the first feed-level `<title>`. HTML in summaries is
/// stripped.
///
/// # Errors
///
/// Returns [`SourceError::Xml`] if the XML is malformed.
pub fn parse_feed(xml: &str) -> Result<ParsedFeed, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedFeed::default();
    let mut item: Option<ItemBuilder> = None;
    // Field being captured plus the tag that opened it, so nested markup
    // inside a summary does not end the capture early.
    let mut capture: Option<(Field, Vec<u8>)> = None;
    let mut feed_title = String::new();
    let mut in_feed_title = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name().as_ref().to_vec();
                if name == b"item" || name == b"entry" {
                    item = Some(ItemBuilder::default());
                    capture = None;
                } else if let Some(builder) = item.as_mut() {
                    if capture.is_none() {
                        if let Some(field) = Field::from_tag(&name) {
                            if field == Field::Link {
                                if let Some(href) = atom_href(&e) {
                                    if builder.link.is_empty() {
                                        builder.link = href;
                                    }
                                    continue;
                                }
                            }
                            capture = Some((field, name));
                        }
                    }
                } else if name == b"title" && parsed.title.is_none() {
                    in_feed_title = true;
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(builder) = item.as_mut() {
                    if e.name().as_ref() == b"link" && builder.link.is_empty() {
                        if let Some(href) = atom_href(&e) {
                            builder.link = href;
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let name = name.as_ref();
                if capture.as_ref().is_some_and(|(_, tag)| tag.as_slice() == name) {
                    capture = None;
                } else if name == b"item" || name == b"entry" {
                    if let Some(builder) = item.take() {
                        parsed.items.push(builder.build());
                    }
                } else if name == b"title" && in_feed_title {
                    in_feed_title = false;
                    let title = feed_title.trim().to_string();
                    if !title.is_empty() {
                        parsed.title = Some(title);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                if let (Some(builder), Some((field, _))) = (item.as_mut(), capture.as_ref()) {
                    builder.push(*field, &text);
                } else if in_feed_title {
                    feed_title.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                if let (Some(builder), Some((field, _))) = (item.as_mut(), capture.as_ref()) {
                    builder.push(*field, &text);
                } else if in_feed_title {
                    feed_title.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    debug!(items = parsed.items.len(), title = ?parsed.title, "Parsed feed");
    Ok(parsed)
}
