//! Combine adapter outputs into one duplicate-free sequence.

use crate::models::{Article, SourceReport};
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Which field identifies "the same story" across sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// First article with a given URL wins; order of first appearance.
    #[default]
    Url,
    /// Last article with a given title wins, placed where that title first
    /// appeared.
    Title,
}

/// Merge the successful reports, in report order, under `strategy`.
///
/// # Arguments
///
/// * `reports` - Adapter outcomes; failed reports contribute nothing
/// * `strategy` - Identity key used to drop duplicates
///
/// # Returns
///
/// The concatenated articles with duplicates removed.
#[instrument(level = "info", skip_all, fields(strategy = ?strategy, reports = reports.len()))]
pub fn merge(reports: &[SourceReport], strategy: DedupStrategy) -> Vec<Article> {
    let all = reports.iter().flat_map(|r| r.articles().iter().cloned());
    let total = reports.iter().map(|r| r.articles().len()).sum::<usize>();

    let merged: Vec<Article> = match strategy {
        DedupStrategy::Url => all.unique_by(|a| a.url.clone()).collect(),
        DedupStrategy::Title => last_by_title(all),
    };

    debug!(total, merged = merged.len(), "Deduplicated articles");
    merged
}

fn last_by_title(articles: impl Iterator<Item = Article>) -> Vec<Article> {
    let mut slot: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Article> = Vec::new();
    for article in articles {
        match slot.get(&article.title) {
            Some(&i) => out[i] = article,
            None => {
                slot.insert(article.title.clone(), out.len());
                out.push(article);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::fixtures::article;

    fn ok(source: &str, articles: Vec<Article>) -> SourceReport {
        SourceReport {
            source: source.into(),
            outcome: Ok(articles),
        }
    }

    #[test]
    fn url_strategy_keeps_first_occurrence() {
        let mut first = article("Original", "https://x/story", None);
        first.source = "first".into();
        let mut second = article("Rewritten headline", "https://x/story", None);
        second.source = "second".into();
        let other = article("Other", "https://x/other", None);

        let merged = merge(
            &[ok("a", vec![first.clone(), other.clone()]), ok("b", vec![second])],
            DedupStrategy::Url,
        );

        assert_eq!(merged, vec![first, other]);
    }

    #[test]
    fn title_strategy_keeps_last_occurrence_at_first_position() {
        let a1 = article("Same title", "https://x/1", None);
        let b = article("Different", "https://x/2", None);
        let a2 = article("Same title", "https://y/1", Some("2024-01-01"));

        let merged = merge(
            &[ok("a", vec![a1, b.clone()]), ok("b", vec![a2.clone()])],
            DedupStrategy::Title,
        );

        assert_eq!(merged, vec![a2, b]);
    }

    #[test]
    fn strategies_disagree_on_the_same_input() {
        let x = article("Shared", "https://x/1", None);
        let y = article("Shared", "https://x/2", None);
        let reports = [ok("a", vec![x.clone(), y.clone()])];

        assert_eq!(merge(&reports, DedupStrategy::Url).len(), 2);
        assert_eq!(merge(&reports, DedupStrategy::Title), vec![y]);
    }

    #[test]
    fn failed_reports_are_skipped() {
        let a = article("A", "https://x/a", None);
        let reports = [
            SourceReport {
                source: "broken".into(),
                outcome: Err(SourceError::MissingField("data")),
            },
            ok("fine", vec![a.clone()]),
        ];
        assert_eq!(merge(&reports, DedupStrategy::Url), vec![a]);
    }

    #[test]
    fn strategy_deserializes_from_snake_case() {
        let s: DedupStrategy = serde_yaml::from_str("title").unwrap();
        assert_eq!(s, DedupStrategy::Title);
        let s: DedupStrategy = serde_yaml::from_str("url").unwrap();
        assert_eq!(s, DedupStrategy::Url);
    }
}
