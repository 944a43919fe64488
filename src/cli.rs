//! Command-line interface definitions.
//!
//! Each capability is its own subcommand. Secrets can come from flags,
//! environment variables (a `.env` file is loaded first) or a credentials
//! document.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Aggregate, rank and deliver a news digest.
///
/// # Examples
///
/// ```sh
/// # Print the ranked headlines
/// news_digest headlines
///
/// # Headlines plus extractive summaries of each page
/// news_digest --config ./user_config.yaml expand
///
/// # Email the digest
/// EMAIL_SENDER=me@example.com EMAIL_PASSWORD=... EMAIL_RECIPIENTS=a@x.com,b@x.com news_digest email
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML/JSON user configuration
    #[arg(short, long, env = "NEWS_DIGEST_CONFIG", default_value = "user_config.json")]
    pub config: PathBuf,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the ranked, deduplicated headlines
    Headlines,
    /// Print headlines, then fetch each article and print a short summary
    Expand,
    /// Print a language-model gist and explanation for each headline
    Summarize,
    /// Send the digest as an HTML email
    Email,
}

/// Provider keys and mail login. Flags override the environment, which
/// overrides the credentials document.
#[derive(Args, Debug, Default, Clone)]
pub struct CredentialArgs {
    /// YAML/JSON document holding any of the keys below
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true, global = true)]
    pub news_api_key: Option<String>,

    #[arg(long, env = "GNEWS_API_KEY", hide_env_values = true, global = true)]
    pub gnews_api_key: Option<String>,

    #[arg(long, env = "MEDIASTACK_API_KEY", hide_env_values = true, global = true)]
    pub mediastack_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "EMAIL_SENDER", global = true)]
    pub email_sender: Option<String>,

    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true, global = true)]
    pub email_password: Option<String>,

    /// Comma-separated list of digest recipients
    #[arg(long, env = "EMAIL_RECIPIENTS", value_delimiter = ',', global = true)]
    pub email_recipients: Vec<String>,
}
