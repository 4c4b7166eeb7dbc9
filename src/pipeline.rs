//! The fetch → classify → persist pipeline.
//!
//! A run moves through these states:
//!
//! ```text
//! Idle -> Fetching -> AnalyzingArticle(1..=N) -> Persisted -> Done
//!            |
//!            +-- no articles --------------------------------> Done
//! ```
//!
//! Articles are processed one at a time, in fetch order. Every fetched
//! article yields exactly one [`AnalyzedArticle`]; a failure anywhere in its
//! step substitutes a degraded record instead of dropping it.

use crate::api::{AskAsync, ask_or_empty};
use crate::error::StepError;
use crate::models::{AnalysisRun, AnalyzedArticle, Classification, RawArticle};
use crate::news::{ArticleFetcher, NewsSource};
use crate::outputs::json::write_analysis;
use crate::parser::parse_response;
use crate::prompt::build_prompt;
use crate::rate::Clock;
use crate::utils::{iso_now, truncate_chars};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Per-run knobs that are not owned by a collaborator.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Pause after each analyzed article.
    pub article_delay: Duration,
    /// Where the run document is written.
    pub output_path: PathBuf,
}

/// Orchestrates one analysis run.
#[derive(Debug)]
pub struct Pipeline<S, A, C> {
    fetcher: ArticleFetcher<S, C>,
    classifier: A,
    clock: C,
    options: PipelineOptions,
}

impl<S, A, C> Pipeline<S, A, C>
where
    S: NewsSource,
    A: AskAsync,
    C: Clock,
{
    pub fn new(fetcher: ArticleFetcher<S, C>, classifier: A, clock: C, options: PipelineOptions) -> Self {
        Self {
            fetcher,
            classifier,
            clock,
            options,
        }
    }

    /// Fetch, analyze and persist. Returns the analyzed articles in fetch
    /// order whether or not the output file could be written.
    #[instrument(level = "info", skip_all, fields(%query, max_articles = max_articles))]
    pub async fn run(&mut self, query: &str, max_articles: u32) -> Vec<AnalyzedArticle> {
        info!(model = self.classifier.model(), "Starting financial news analysis");

        let articles = match self.fetcher.fetch(query, max_articles).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "Fetch produced no articles");
                Vec::new()
            }
        };
        if articles.is_empty() {
            info!("No news articles found; nothing to analyze");
            return Vec::new();
        }

        let analyzed = self.analyze_all(&articles).await;

        let run = AnalysisRun::new(
            analyzed,
            iso_now(),
            self.fetcher.requests_made(),
            self.classifier.model(),
        );
        if let Err(e) = write_analysis(&run, &self.options.output_path).await {
            error!(
                path = %self.options.output_path.display(),
                error = %e,
                "Error saving results"
            );
        }

        let degraded = run.articles.iter().filter(|a| a.is_degraded()).count();
        info!(count = run.articles.len(), degraded, "Analysis complete");
        run.articles
    }

    /// Analyze every article in order, pausing after each successful one.
    pub async fn analyze_all(&self, articles: &[RawArticle]) -> Vec<AnalyzedArticle> {
        let total = articles.len();
        let mut analyzed = Vec::with_capacity(total);

        for (i, article) in articles.iter().enumerate() {
            info!(
                index = i + 1,
                total,
                headline = %truncate_chars(&article.title, 50),
                "Analyzing article"
            );

            match self.analyze_one(article).await {
                Ok(classification) => {
                    analyzed.push(AnalyzedArticle::new(article, classification, iso_now()));
                    self.clock.sleep(self.options.article_delay).await;
                }
                Err(e) => {
                    error!(index = i + 1, error = %e, "Error analyzing article");
                    analyzed.push(AnalyzedArticle::new(
                        article,
                        Classification::degraded_analysis(),
                        iso_now(),
                    ));
                }
            }
        }
        analyzed
    }

    /// Prompt, classify and parse one article. A panic anywhere in the step
    /// is contained and reported as a [`StepError`].
    async fn analyze_one(&self, article: &RawArticle) -> Result<Classification, StepError> {
        let step = async {
            let prompt = build_prompt(article);
            let raw = ask_or_empty(&self.classifier, &prompt).await;
            parse_response(&raw)
        };

        AssertUnwindSafe(step)
            .catch_unwind()
            .await
            .map_err(|payload| StepError::Panicked(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
