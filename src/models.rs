//! Data models for fetched articles and their analyzed representations.
//!
//! - [`RawArticle`]: a news item as normalized from the news search API
//! - [`Classification`]: sentiment and stock impact extracted from the LLM
//! - [`AnalyzedArticle`]: one output record, article display fields plus classification
//! - [`AnalysisRun`]: the persisted document for a whole run
//!
//! `AnalyzedArticle` keeps the camelCase `publishedAt` key of the upstream
//! API so the output document matches what downstream consumers already read.

use serde::{Deserialize, Serialize};

/// Sentinel written when the model response could not be parsed.
pub const PARSE_FAILED: &str = "Analysis parsing failed";
/// Sentinel written when the per-article step itself failed.
pub const ANALYSIS_FAILED: &str = "Analysis failed";

/// A news article as returned by the news search API.
///
/// Every field defaults to an empty string when the upstream item omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    /// Publication timestamp, kept verbatim from upstream.
    pub published_at: String,
    /// Display name of the publishing outlet.
    pub source: String,
}

/// Sentiment and stock impact for one article.
///
/// Values are not checked against the documented enumerations; whatever the
/// model returned (lower-cased) is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// `positive`, `negative` or `neutral`.
    pub sentiment: String,
    pub affected_stocks: Vec<String>,
    pub impact_description: String,
    /// `high`, `medium` or `low`.
    pub confidence: String,
}

impl Classification {
    /// Fallback used when the completion text holds no usable JSON object.
    pub fn degraded_parse() -> Self {
        Self::degraded(PARSE_FAILED)
    }

    /// Fallback used when analyzing an article failed outright.
    pub fn degraded_analysis() -> Self {
        Self::degraded(ANALYSIS_FAILED)
    }

    fn degraded(reason: &str) -> Self {
        Self {
            sentiment: "neutral".to_string(),
            affected_stocks: Vec::new(),
            impact_description: reason.to_string(),
            confidence: "low".to_string(),
        }
    }
}

/// One output record: article display fields plus its classification.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    pub headline: String,
    pub description: String,
    pub url: String,
    pub publishedAt: String,
    pub source: String,
    pub sentiment: String,
    pub affected_stocks: Vec<String>,
    pub impact_description: String,
    pub confidence: String,
    /// ISO 8601 time at which the article was analyzed.
    pub analysis_timestamp: String,
}

impl AnalyzedArticle {
    /// Merge an article's display fields with its classification.
    pub fn new(article: &RawArticle, classification: Classification, analyzed_at: String) -> Self {
        Self {
            headline: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            publishedAt: article.published_at.clone(),
            source: article.source.clone(),
            sentiment: classification.sentiment,
            affected_stocks: classification.affected_stocks,
            impact_description: classification.impact_description,
            confidence: classification.confidence,
            analysis_timestamp: analyzed_at,
        }
    }

    /// Whether the classification came from a fallback path rather than the model.
    pub fn is_degraded(&self) -> bool {
        self.confidence == "low"
            && (self.impact_description == PARSE_FAILED
                || self.impact_description == ANALYSIS_FAILED)
    }
}

/// Summary block at the top of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub total_articles: usize,
    pub analysis_date: String,
    pub news_api_requests_used: u32,
    pub model_used: String,
}

/// The persisted output of one run. Written once and never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub analysis_metadata: AnalysisMetadata,
    pub articles: Vec<AnalyzedArticle>,
}

impl AnalysisRun {
    pub fn new(
        articles: Vec<AnalyzedArticle>,
        analysis_date: String,
        requests_used: u32,
        model: &str,
    ) -> Self {
        Self {
            analysis_metadata: AnalysisMetadata {
                total_articles: articles.len(),
                analysis_date,
                news_api_requests_used: requests_used,
                model_used: model.to_string(),
            },
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> RawArticle {
        RawArticle {
            title: "Chipmaker beats estimates".to_string(),
            description: "Quarterly revenue up 20%".to_string(),
            content: "Full body".to_string(),
            url: "https://example.com/chips".to_string(),
            published_at: "2025-05-06T14:30:00Z".to_string(),
            source: "Example Wire".to_string(),
        }
    }

    #[test]
    fn test_degraded_variants_differ_only_in_description() {
        let parse = Classification::degraded_parse();
        let step = Classification::degraded_analysis();
        assert_eq!(parse.sentiment, "neutral");
        assert_eq!(parse.confidence, "low");
        assert!(parse.affected_stocks.is_empty());
        assert_eq!(parse.impact_description, "Analysis parsing failed");
        assert_eq!(step.impact_description, "Analysis failed");

        let article = sample_article();
        assert!(AnalyzedArticle::new(&article, parse, String::new()).is_degraded());
        assert!(AnalyzedArticle::new(&article, step, String::new()).is_degraded());
    }

    #[test]
    fn test_genuine_low_confidence_is_not_degraded() {
        let c = Classification {
            sentiment: "neutral".to_string(),
            affected_stocks: vec![],
            impact_description: "Unclear".to_string(),
            confidence: "low".to_string(),
        };
        assert!(!AnalyzedArticle::new(&sample_article(), c, String::new()).is_degraded());
    }

    #[test]
    fn test_analyzed_article_copies_display_fields() {
        let article = sample_article();
        let c = Classification {
            sentiment: "positive".to_string(),
            affected_stocks: vec!["NVDA".to_string()],
            impact_description: "Likely up".to_string(),
            confidence: "high".to_string(),
        };
        let analyzed = AnalyzedArticle::new(&article, c, "2025-05-06T15:00:00+00:00".to_string());

        assert_eq!(analyzed.headline, article.title);
        assert_eq!(analyzed.publishedAt, article.published_at);
        assert_eq!(analyzed.source, "Example Wire");
        assert_eq!(analyzed.affected_stocks, vec!["NVDA"]);
        assert_eq!(analyzed.analysis_timestamp, "2025-05-06T15:00:00+00:00");
    }

    #[test]
    fn test_analyzed_article_has_exactly_ten_keys() {
        let analyzed = AnalyzedArticle::new(
            &sample_article(),
            Classification::degraded_parse(),
            "2025-05-06T15:00:00+00:00".to_string(),
        );
        let value = serde_json::to_value(&analyzed).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "affected_stocks",
                "analysis_timestamp",
                "confidence",
                "description",
                "headline",
                "impact_description",
                "publishedAt",
                "sentiment",
                "source",
                "url",
            ]
        );
    }

    #[test]
    fn test_analysis_run_counts_articles() {
        let a = AnalyzedArticle::new(
            &sample_article(),
            Classification::degraded_analysis(),
            "t".to_string(),
        );
        let run = AnalysisRun::new(vec![a.clone(), a], "2025-05-06".to_string(), 1, "some/model");
        assert_eq!(run.analysis_metadata.total_articles, 2);
        assert_eq!(run.analysis_metadata.news_api_requests_used, 1);
        assert_eq!(run.analysis_metadata.model_used, "some/model");
    }
}
