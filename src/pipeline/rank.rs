//! Order by recency and cap the digest length.

use crate::models::Article;
use std::cmp::Reverse;
use tracing::{debug, instrument};

/// Sort newest first and keep at most `cap` articles.
///
/// Missing or unparsable timestamps count as the oldest instant. The sort
/// is stable, so equal timestamps keep their input order.
///
/// # Arguments
///
/// * `articles` - Merged articles, consumed
/// * `cap` - Maximum digest length
///
/// # Returns
///
/// At most `cap` articles, most recent first.
#[instrument(level = "info", skip_all, fields(input = articles.len(), cap = cap))]
pub fn rank(mut articles: Vec<Article>, cap: usize) -> Vec<Article> {
    articles.sort_by_cached_key(|a| Reverse(a.published()));
    articles.truncate(cap);
    debug!(output = articles.len(), "Ranked articles");
    articles
}
