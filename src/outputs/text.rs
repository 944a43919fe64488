//! Plain-text renderings of the digest.

use crate::models::{Article, ExpandedArticle};
use std::fmt::Write;

/// Shown when no summary could be built for an expanded article.
pub const NO_SUMMARY: &str = "No content available.";
/// Shown when an article's page yielded no text.
pub const NO_FULL_TEXT: &str = "No content could be retrieved.";

const EXPANDED_RULE: &str = "-------------- Expanded news of the headlines -------------";

/// Numbered headline list with each article's teaser underneath.
///
/// ```text
/// 1. Title (Source)
///    Description
/// ```
pub fn render_headlines(articles: &[Article]) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, article.title, article.source);
        let _ = writeln!(out, "   {}\n", article.description);
    }
    out
}

/// Headline index followed by each article's summary and full text.
pub fn render_expanded(expanded: &[ExpandedArticle]) -> String {
    let mut out = String::from("\nHEADLINES:\n\n");
    for (i, e) in expanded.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, e.article.title);
    }

    let _ = writeln!(out, "\n{EXPANDED_RULE}\n");
    for (i, e) in expanded.iter().enumerate() {
        let summary = if e.summary.is_empty() { NO_SUMMARY } else { &e.summary };
        let full_text = if e.full_text.is_empty() { NO_FULL_TEXT } else { &e.full_text };
        let _ = writeln!(out, "{}. {} ({})", i + 1, e.article.title, e.article.source);
        let _ = writeln!(out, "Summary: {summary}");
        let _ = writeln!(out, "Full Article: {full_text}\n");
    }
    out
}

/// One block per model summary, separated by a rule.
pub fn render_summaries(items: &[(Article, String)]) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    for (article, summary) in items {
        let _ = writeln!(out, "📰 {}", article.title);
        let _ = writeln!(out, "{summary}\n{rule}\n");
    }
    out
}

/// `text/plain` alternative of the mail digest.
pub fn render_digest(articles: &[Article]) -> String {
    let mut out = String::from("Daily News Update\n\n");
    for (i, article) in articles.iter().enumerate() {
        let published = article.published_at.as_deref().unwrap_or("unknown");
        let _ = writeln!(out, "{}. {}", i + 1, article.title);
        let _ = writeln!(out, "   Source: {}", article.source);
        let _ = writeln!(out, "   Published At: {published}");
        let _ = writeln!(out, "   {}\n", article.url);
    }
    out
}
