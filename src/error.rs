//! Error types, one enum per concern.
//!
//! Source and dispatch failures are recoverable: the pipeline logs them and
//! carries on with fewer results. Configuration failures are fatal and
//! bubble up to `main`.

use thiserror::Error;

/// Why a single source adapter produced no articles.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("response is missing the `{0}` array")]
    MissingField(&'static str),
}

/// Setup errors. These abort the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("missing credential {0} (set it in the environment or the credentials file)")]
    MissingCredential(&'static str),
}

/// Anything that stops the digest email from going out.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("cannot build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("no recipients configured")]
    NoRecipients,
}
