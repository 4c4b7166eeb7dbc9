//! # Market News Sentiment
//!
//! Fetches recent financial news from NewsAPI, asks an OpenAI-compatible LLM
//! (OpenRouter by default) to classify each article's market sentiment and
//! affected stocks, and writes the combined results to a single JSON file.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... OPENROUTER_API_KEY=... market_news_sentiment -q "chip stocks" -n 3
//! ```
//!
//! ## Architecture
//!
//! The application follows a strictly sequential pipeline:
//! 1. **Fetching**: one rate-limited search against the news API
//! 2. **Prompting**: render the analysis template for each article
//! 3. **Classifying**: one completion request per article, paced by a fixed delay
//! 4. **Parsing**: extract the JSON classification, defaulting anything missing
//! 5. **Output**: write the run document and print a short sample

use clap::Parser;
use reqwest::Client;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod news;
mod outputs;
mod parser;
mod pipeline;
mod prompt;
mod rate;
mod utils;

use api::ChatCompletionClient;
use cli::Cli;
use config::{Credentials, FileConfig, Settings};
use error::ConfigError;
use models::AnalyzedArticle;
use news::{ArticleFetcher, NewsApiClient};
use outputs::summary::render_sample;
use pipeline::{Pipeline, PipelineOptions};
use rate::{RateLimiter, TokioClock};

const TROUBLESHOOTING: &str = "\
Troubleshooting tips:
1. Check NEWS_API_KEY and OPENROUTER_API_KEY in your .env file or environment
2. Ensure you have an internet connection
3. Verify your NewsAPI and OpenRouter accounts are active";

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("market_news_sentiment starting up");

    // Keys kept in .env must be visible to clap's env fallbacks.
    if let Ok(path) = dotenv::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }

    let args = Cli::parse();
    debug!(query = ?args.query, max_articles = ?args.max_articles, output = ?args.output, "Parsed CLI arguments");

    match run(args).await {
        Ok(results) => {
            print!("{}", render_sample(&results));
            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                articles = results.len(),
                "Execution complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Application error");
            eprintln!("Application error: {e}\n\n{TROUBLESHOOTING}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve configuration, wire the collaborators and run the pipeline once.
///
/// Only configuration problems are returned as errors; everything after the
/// clients are built degrades in place.
async fn run(args: Cli) -> Result<Vec<AnalyzedArticle>, ConfigError> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let credentials =
        Credentials::resolve(args.news_api_key.clone(), args.openrouter_api_key.clone())?;
    info!("API keys validated successfully");
    let settings = Settings::resolve(&args, file)?;

    let news = NewsApiClient::with_timeout(
        settings.news_api_url.clone(),
        credentials.news_api_key,
        settings.request_timeout,
    )
    .map_err(ConfigError::HttpClient)?;

    let http = Client::builder().build().map_err(ConfigError::HttpClient)?;
    let classifier = ChatCompletionClient::new(
        http,
        &settings.completion_base_url,
        credentials.openrouter_api_key,
        settings.model.clone(),
        settings.sampling,
    )
    .map_err(|source| ConfigError::InvalidUrl {
        url: settings.completion_base_url.to_string(),
        source,
    })?;

    let clock = TokioClock;
    let limiter = RateLimiter::new(settings.max_news_requests, settings.min_request_interval);
    let fetcher = ArticleFetcher::new(news, limiter, clock);
    let mut pipeline = Pipeline::new(
        fetcher,
        classifier,
        clock,
        PipelineOptions {
            article_delay: settings.article_delay,
            output_path: settings.output_path.clone(),
        },
    );

    info!(
        query = %settings.query,
        max_articles = settings.max_articles,
        model = %settings.model,
        output = %settings.output_path.display(),
        "Running analysis"
    );
    Ok(pipeline.run(&settings.query, settings.max_articles).await)
}
