//! Command-line interface definitions.
//!
//! Credentials and the model override can come from flags or from the
//! environment. Every other option may also be set in the YAML config file;
//! flags win over the file.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one analysis run.
///
/// # Examples
///
/// ```sh
/// # Default query, three articles, output in the working directory
/// NEWS_API_KEY=... OPENROUTER_API_KEY=... market_news_sentiment
///
/// # Custom query and output path
/// market_news_sentiment -q "semiconductor earnings" -n 5 -o ./out/analysis.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of articles to fetch and analyze
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_articles: Option<u32>,

    /// Path of the JSON output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Completion model identifier
    #[arg(long, env = "OPENROUTER_MODEL")]
    pub model: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,
}
