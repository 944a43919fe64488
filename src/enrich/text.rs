//! Pure text helpers: paragraph extraction and extractive summaries.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static PARAGRAPH: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("static selector is valid"));

// Terminal punctuation followed by whitespace ends a sentence.
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("static regex is valid"));

/// Visible text of every `<p>` whose trimmed text is longer than
/// `min_chars` characters, one paragraph per line.
pub fn extract_paragraphs(html: &str, min_chars: usize) -> String {
    let document = Html::parse_document(html);
    document
        .select(&PARAGRAPH)
        .map(|p| {
            p.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| text.chars().count() > min_chars)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Split `text` into sentences, keeping each sentence's terminal
/// punctuation.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        // The match is one ASCII punctuation byte plus whitespace.
        let end = m.start() + 1;
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// The first `max_sentences` sentences joined by a space. Empty input gives
/// an empty summary.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    split_sentences(text)
        .into_iter()
        .take(max_sentences)
        .collect::<Vec<_>>()
        .join(" ")
}
