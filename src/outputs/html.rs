//! HTML digest for the mail body.

use crate::models::Article;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

/// Heading placed above the article list.
pub const DIGEST_HEADING: &str = "📰 Daily News Update";

/// Render the digest as an HTML fragment.
///
/// Every interpolated value is escaped, including the link target, so
/// provider text can never inject markup.
pub fn render_digest(articles: &[Article]) -> String {
    let mut html = String::with_capacity(256 + articles.len() * 320);
    let _ = write!(html, "<h2>{}</h2><br>", encode_text(DIGEST_HEADING));
    for (i, article) in articles.iter().enumerate() {
        let published = article.published_at.as_deref().unwrap_or("unknown");
        let _ = write!(
            html,
            "<h3>{}. {}</h3>\
             <p><strong>Source:</strong> {}<br>\
             <strong>Published At:</strong> {}<br>\
             <a href=\"{}\">Read full article</a></p><hr>",
            i + 1,
            encode_text(&article.title),
            encode_text(&article.source),
            encode_text(published),
            encode_double_quoted_attribute(&article.url),
        );
    }
    html
}
