//! Human-readable sample of a run's results for the terminal.

use crate::models::AnalyzedArticle;
use std::fmt::Write;

/// Number of articles shown in the terminal sample.
pub const SAMPLE_SIZE: usize = 2;

/// Render up to [`SAMPLE_SIZE`] results. Returns an empty string when there
/// is nothing to show.
pub fn render_sample(results: &[AnalyzedArticle]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "\nSample Analysis Results:");
    let _ = writeln!(out, "{}", "=".repeat(50));

    for (i, article) in results.iter().take(SAMPLE_SIZE).enumerate() {
        let stocks = if article.affected_stocks.is_empty() {
            "None identified".to_string()
        } else {
            article.affected_stocks.join(", ")
        };

        let _ = writeln!(out, "\nArticle {}:", i + 1);
        let _ = writeln!(out, "Headline: {}", article.headline);
        let _ = writeln!(out, "Sentiment: {}", article.sentiment.to_uppercase());
        let _ = writeln!(out, "Affected Stocks: {}", stocks);
        let _ = writeln!(out, "Impact: {}", article.impact_description);
        let _ = writeln!(out, "Confidence: {}", article.confidence.to_uppercase());
        let _ = writeln!(out, "{}", "-".repeat(30));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, RawArticle};

    fn analyzed(title: &str, stocks: &[&str]) -> AnalyzedArticle {
        let raw = RawArticle {
            title: title.to_string(),
            ..Default::default()
        };
        let c = Classification {
            sentiment: "positive".to_string(),
            affected_stocks: stocks.iter().map(|s| s.to_string()).collect(),
            impact_description: "Shares likely to rise".to_string(),
            confidence: "high".to_string(),
        };
        AnalyzedArticle::new(&raw, c, String::new())
    }

    #[test]
    fn test_empty_results_render_nothing() {
        assert_eq!(render_sample(&[]), "");
    }

    #[test]
    fn test_sample_shows_at_most_two_articles() {
        let results = vec![
            analyzed("First", &["AAPL"]),
            analyzed("Second", &[]),
            analyzed("Third", &["MSFT"]),
        ];
        let out = render_sample(&results);
        assert!(out.contains("Article 1:"));
        assert!(out.contains("Article 2:"));
        assert!(!out.contains("Article 3:"));
        assert!(!out.contains("Third"));
    }

    #[test]
    fn test_sample_formats_fields() {
        let out = render_sample(&[analyzed("Chip rally", &["NVDA", "AMD"]), analyzed("Quiet day", &[])]);
        assert!(out.contains("Headline: Chip rally"));
        assert!(out.contains("Sentiment: POSITIVE"));
        assert!(out.contains("Affected Stocks: NVDA, AMD"));
        assert!(out.contains("Affected Stocks: None identified"));
        assert!(out.contains("Impact: Shares likely to rise"));
        assert!(out.contains("Confidence: HIGH"));
    }
}
