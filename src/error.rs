//! Error types for each stage of the analysis pipeline.
//!
//! Only [`ConfigError`] ever reaches the process boundary. Every other error
//! is logged by the stage that produced it and converted into a safe default
//! by the orchestrator:
//!
//! | Error | Default substituted |
//! |-------|---------------------|
//! | [`FetchError`] | empty article list |
//! | [`ClassifyError`] | empty completion text |
//! | [`ParseError`] | `Classification::degraded_parse()` |
//! | [`StepError`] | `Classification::degraded_analysis()` |
//! | [`PersistError`] | none; results stay in memory |

use std::path::PathBuf;
use thiserror::Error;

/// Fatal startup conditions. One named variant per missing credential.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NEWS_API_KEY not found in environment variables")]
    MissingNewsApiKey,

    #[error("OPENROUTER_API_KEY not found in environment variables")]
    MissingOpenRouterKey,

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid endpoint URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failures of a single news-search call.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("daily news API limit reached ({limit} requests)")]
    RateLimitExceeded { limit: u32 },

    #[error("news API request failed with status {status}")]
    Status { status: u16 },

    #[error("news API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("news API returned an undecodable body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Failures of a single completion call.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("completion request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion service rejected credentials (status {status})")]
    Auth { status: u16 },

    #[error("completion service returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("completion response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("completion response contained no choices")]
    MissingChoice,

    #[error("completion choice carried no message content")]
    EmptyContent,
}

/// Reasons a completion could not be turned into a classification.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model response")]
    NoJsonObject,

    #[error("malformed JSON in model response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model response JSON is not an object")]
    NotAnObject,

    #[error("field `{field}` has an unexpected type")]
    WrongType { field: &'static str },
}

/// A per-article step that aborted before producing a classification.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("article analysis panicked: {0}")]
    Panicked(String),
}

/// The run's output document could not be written.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize analysis run: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type ClassifyResult<T> = Result<T, ClassifyError>;
pub type ParseResult<T> = Result<T, ParseError>;
