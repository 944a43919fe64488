//! # News Digest
//!
//! Aggregates headlines from several news APIs and RSS/Atom feeds into one
//! deduplicated, recency-ranked digest, then prints it, enriches it with
//! page text or model summaries, or emails it.
//!
//! ## Features
//!
//! - NewsAPI, GNews and Mediastack adapters plus any number of RSS/Atom feeds
//! - URL or title deduplication, newest-first ranking, configurable cap
//! - Extractive summaries from each article's landing page
//! - Optional gist and explanation from an OpenAI-compatible chat model
//! - HTML digest email over authenticated SMTP
//!
//! ## Usage
//!
//! ```sh
//! news_digest --config user_config.json headlines
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: run each configured source in order; a failing source
//!    is logged and skipped
//! 2. **Merging**: concatenate and deduplicate the surviving articles
//! 3. **Ranking**: sort newest first and keep the top `max_articles`
//! 4. **Output**: print, expand, summarize or email the digest

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod enrich;
mod error;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use api::{ChatClient, summarize_news_item};
use cli::{Cli, Command};
use config::{Credentials, CredentialsFile, Settings};
use enrich::Expander;
use outputs::mail::{SmtpRelay, dispatch_digest};
use outputs::text;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();

    // Variables from .env must be visible before clap reads `env` fallbacks.
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let args = Cli::parse();
    info!(command = ?args.command, config = %args.config.display(), "news_digest starting up");

    let settings = Settings::load(&args.config)?;
    let file = match &args.credentials.credentials {
        Some(path) => CredentialsFile::load(path)?,
        None => CredentialsFile::default(),
    };
    let credentials = Credentials::resolve(&args.credentials, file);
    debug!(?credentials, "Resolved credentials");

    // Fail on missing secrets before spending time on the network.
    let mail_account = match args.command {
        Command::Email => Some(credentials.mail_account()?),
        Command::Summarize => {
            credentials.openai_key()?;
            None
        }
        _ => None,
    };

    let sources = sources::from_settings(&settings, &credentials)?;
    let http = reqwest::Client::new();
    let reports = pipeline::collect(&sources, &http).await;
    let digest = pipeline::build_digest(&reports, settings.dedup, settings.max_articles);
    let article_count = digest.len();

    match args.command {
        Command::Headlines => {
            print!("{}", text::render_headlines(&digest));
        }
        Command::Expand => {
            let expander = Expander::new(&settings.expander)?;
            let expanded = expander.expand_all(digest).await;
            print!("{}", text::render_expanded(&expanded));
        }
        Command::Summarize => {
            let key = credentials.openai_key()?;
            let client = ChatClient::new(http.clone(), key.to_string(), &settings.llm)?;
            let mut items = Vec::with_capacity(digest.len());
            for article in digest {
                let summary = summarize_news_item(&client, &article.title, article.body()).await;
                items.push((article, summary));
            }
            print!("{}", text::render_summaries(&items));
        }
        Command::Email => {
            if let Some(account) = &mail_account {
                let sent = match SmtpRelay::new(&settings.mail, account) {
                    Ok(relay) => {
                        dispatch_digest(&relay, account, &settings.mail.subject, &digest).await
                    }
                    Err(e) => Err(e),
                };
                if let Err(e) = sent {
                    error!(error = %e, host = %settings.mail.host, "Failed to send digest email");
                }
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        articles = article_count,
        "news_digest finished"
    );
    Ok(())
}
