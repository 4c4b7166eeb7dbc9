//! News search client and the rate-limited article fetcher.
//!
//! [`NewsApiClient`] talks to a NewsAPI-compatible `/v2/everything`
//! endpoint and normalizes each upstream item into a [`RawArticle`].
//! [`ArticleFetcher`] wraps any [`NewsSource`] with the daily budget and
//! minimum request spacing enforced by [`RateLimiter`].

use crate::error::{FetchError, FetchResult};
use crate::models::RawArticle;
use crate::rate::{Clock, RateLimiter};
use chrono::{DateTime, Duration as ChronoDuration, Local};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Trailing window searched on every request.
const SEARCH_WINDOW_DAYS: i64 = 7;

/// A searchable news source.
pub trait NewsSource {
    /// Issue one search and return the matching articles in upstream order.
    async fn search(&self, query: &str, page_size: u32) -> FetchResult<Vec<RawArticle>>;
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    #[serde(default)]
    articles: Vec<WireArticle>,
}

#[allow(non_snake_case)]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    publishedAt: Option<String>,
    source: Option<WireSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireSource {
    name: Option<String>,
}

impl From<WireArticle> for RawArticle {
    fn from(w: WireArticle) -> Self {
        Self {
            title: w.title.unwrap_or_default(),
            description: w.description.unwrap_or_default(),
            content: w.content.unwrap_or_default(),
            url: w.url.unwrap_or_default(),
            published_at: w.publishedAt.unwrap_or_default(),
            source: w.source.and_then(|s| s.name).unwrap_or_default(),
        }
    }
}

/// `from`/`to` query dates (`YYYY-MM-DD`) covering the trailing week.
pub fn date_window(now: DateTime<Local>) -> (String, String) {
    let start = now - ChronoDuration::days(SEARCH_WINDOW_DAYS);
    (
        start.format("%Y-%m-%d").to_string(),
        now.format("%Y-%m-%d").to_string(),
    )
}

/// HTTP client for the NewsAPI `everything` endpoint.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(http: Client, endpoint: Url, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    /// Build a client with its own HTTP connection pool and request timeout.
    pub fn with_timeout(
        endpoint: Url,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, endpoint, api_key))
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(%query, page_size = page_size))]
    async fn search(&self, query: &str, page_size: u32) -> FetchResult<Vec<RawArticle>> {
        let (from, to) = date_window(Local::now());
        let page_size = page_size.to_string();

        info!(%from, %to, "Fetching financial news");
        let resp = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("q", query),
                ("apiKey", self.api_key.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: NewsEnvelope = resp.json().await.map_err(FetchError::Decode)?;
        let articles: Vec<RawArticle> = envelope.articles.into_iter().map(RawArticle::from).collect();
        debug!(count = articles.len(), "Decoded news envelope");
        Ok(articles)
    }
}

/// A [`NewsSource`] guarded by a daily budget and minimum request spacing.
#[derive(Debug)]
pub struct ArticleFetcher<S, C> {
    source: S,
    limiter: RateLimiter,
    clock: C,
}

impl<S, C> ArticleFetcher<S, C>
where
    S: NewsSource,
    C: Clock,
{
    pub fn new(source: S, limiter: RateLimiter, clock: C) -> Self {
        Self {
            source,
            limiter,
            clock,
        }
    }

    /// Fetch up to `max_articles` recent articles for `query`.
    ///
    /// Waits out any remaining request spacing on the injected clock before
    /// the search is issued.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text topic passed to the news search
    /// * `max_articles` - Page size requested from the source
    ///
    /// # Returns
    ///
    /// The articles in upstream order, or [`FetchError::RateLimitExceeded`]
    /// without touching the network once the daily budget is spent. Only an
    /// HTTP 200 counts against the budget.
    pub async fn fetch(&mut self, query: &str, max_articles: u32) -> FetchResult<Vec<RawArticle>> {
        if !self.limiter.try_acquire() {
            let limit = self.limiter.max_requests();
            warn!(limit, "Daily news API limit reached");
            return Err(FetchError::RateLimitExceeded { limit });
        }

        let wait = self.limiter.wait_time(self.clock.now());
        if !wait.is_zero() {
            debug!(?wait, "Spacing out news API requests");
            self.clock.sleep(wait).await;
        }

        self.limiter.mark_sent(self.clock.now());
        match self.source.search(query, max_articles).await {
            Ok(articles) => {
                self.limiter.record_request();
                info!(
                    count = articles.len(),
                    requests_used = self.limiter.requests_made(),
                    "Fetched articles"
                );
                Ok(articles)
            }
            Err(e) => {
                error!(error = %e, "News fetch failed");
                Err(e)
            }
        }
    }

    pub fn requests_made(&self) -> u32 {
        self.limiter.requests_made()
    }
}
