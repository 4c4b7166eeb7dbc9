//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags and environment variables. Credentials are never read
//! from the file.
//!
//! ```yaml
//! # config.yaml (every key optional)
//! news_api_url: https://newsapi.org/v2/everything
//! completion_base_url: https://openrouter.ai/api/v1
//! model: meta-llama/llama-2-70b-chat
//! max_news_requests: 100
//! min_request_interval_ms: 1000
//! article_delay_ms: 2000
//! request_timeout_secs: 30
//! temperature: 0.3
//! max_tokens: 500
//! output_path: financial_news_analysis.json
//! query: stock market technology companies
//! max_articles: 3
//! ```

use crate::api::Sampling;
use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-2-70b-chat";
pub const DEFAULT_QUERY: &str = "stock market technology companies";
pub const DEFAULT_MAX_ARTICLES: u32 = 3;
/// NewsAPI rejects a `pageSize` above this.
pub const MAX_ARTICLES_LIMIT: u32 = 100;
pub const DEFAULT_OUTPUT_PATH: &str = "financial_news_analysis.json";
/// NewsAPI free tier allowance.
pub const DEFAULT_MAX_NEWS_REQUESTS: u32 = 100;
const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 1_000;
const DEFAULT_ARTICLE_DELAY_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Contents of the optional YAML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub news_api_url: Option<String>,
    pub completion_base_url: Option<String>,
    pub model: Option<String>,
    pub max_news_requests: Option<u32>,
    pub min_request_interval_ms: Option<u64>,
    pub article_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub output_path: Option<PathBuf>,
    pub query: Option<String>,
    pub max_articles: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

/// The two secrets a run needs.
pub struct Credentials {
    pub news_api_key: String,
    pub openrouter_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api_key", &"<redacted>")
            .field("openrouter_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Both keys must be present and non-empty; the news key is checked first.
    pub fn resolve(
        news_api_key: Option<String>,
        openrouter_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let news_api_key = non_empty(news_api_key).ok_or(ConfigError::MissingNewsApiKey)?;
        let openrouter_api_key =
            non_empty(openrouter_api_key).ok_or(ConfigError::MissingOpenRouterKey)?;
        Ok(Self {
            news_api_key,
            openrouter_api_key,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub news_api_url: Url,
    pub completion_base_url: Url,
    pub model: String,
    pub max_news_requests: u32,
    pub min_request_interval: Duration,
    pub article_delay: Duration,
    pub request_timeout: Duration,
    pub sampling: Sampling,
    pub output_path: PathBuf,
    pub query: String,
    pub max_articles: u32,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let defaults = Sampling::default();
        let max_articles = cli
            .max_articles
            .or(file.max_articles)
            .unwrap_or(DEFAULT_MAX_ARTICLES);
        if !(1..=MAX_ARTICLES_LIMIT).contains(&max_articles) {
            return Err(ConfigError::OutOfRange {
                field: "max_articles",
                value: max_articles,
                min: 1,
                max: MAX_ARTICLES_LIMIT,
            });
        }

        Ok(Self {
            news_api_url: parse_url(file.news_api_url.as_deref().unwrap_or(DEFAULT_NEWS_API_URL))?,
            completion_base_url: parse_url(
                file.completion_base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_COMPLETION_BASE_URL),
            )?,
            model: non_empty(cli.model.clone())
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_news_requests: file.max_news_requests.unwrap_or(DEFAULT_MAX_NEWS_REQUESTS),
            min_request_interval: Duration::from_millis(
                file.min_request_interval_ms
                    .unwrap_or(DEFAULT_MIN_REQUEST_INTERVAL_MS),
            ),
            article_delay: Duration::from_millis(
                file.article_delay_ms.unwrap_or(DEFAULT_ARTICLE_DELAY_MS),
            ),
            request_timeout: Duration::from_secs(
                file.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            sampling: Sampling {
                temperature: file.temperature.unwrap_or(defaults.temperature),
                max_tokens: file.max_tokens.unwrap_or(defaults.max_tokens),
            },
            output_path: cli
                .output
                .clone()
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            query: cli
                .query
                .clone()
                .or(file.query)
                .unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            max_articles,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
