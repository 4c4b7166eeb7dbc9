//! Instruction template sent to the completion service for each article.
//!
//! The response shape requested here is what [`crate::parser`] expects; the
//! two must change together.

use crate::models::RawArticle;
use crate::utils::truncate_chars;

/// Characters of article body embedded in the prompt.
pub const CONTENT_PREVIEW_CHARS: usize = 500;

/// System message establishing the analyst persona and output format.
pub const SYSTEM_PROMPT: &str =
    "You are a financial analyst expert. Provide accurate, well-reasoned analysis in JSON format.";

/// Render the analysis prompt for one article.
pub fn build_prompt(article: &RawArticle) -> String {
    format!(
        r#"
You are a financial analyst specializing in news sentiment analysis and stock market impact assessment.

Please analyze the following financial news article and provide a structured response in JSON format:

HEADLINE: {title}
DESCRIPTION: {description}
CONTENT: {content}...

Analyze this news for:
1. SENTIMENT: Determine if the news is positive, negative, or neutral for the financial markets
2. AFFECTED STOCKS: Identify specific stocks, companies, or sectors that might be affected
3. IMPACT: Describe the potential impact on stock prices (increase, decrease, volatility, etc.)

Respond in this exact JSON format:
{{
    "sentiment": "positive|negative|neutral",
    "affected_stocks": ["AAPL", "GOOGL", "TSLA"],
    "impact_description": "Detailed description of expected impact",
    "confidence": "high|medium|low"
}}

Guidelines:
- Be specific about stock tickers when possible
- Consider both direct and indirect impacts
- Assess market sentiment realistically
- Focus on actionable insights for investors
"#,
        title = article.title,
        description = article.description,
        content = truncate_chars(&article.content, CONTENT_PREVIEW_CHARS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(content: &str) -> RawArticle {
        RawArticle {
            title: "Fed holds rates".to_string(),
            description: "Policy unchanged for third meeting".to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_embeds_title_and_description_verbatim() {
        let prompt = build_prompt(&article("body"));
        assert!(prompt.contains("HEADLINE: Fed holds rates\n"));
        assert!(prompt.contains("DESCRIPTION: Policy unchanged for third meeting\n"));
        assert!(prompt.contains("CONTENT: body...\n"));
    }

    #[test]
    fn test_prompt_truncates_content_to_500_chars() {
        let body = format!("{}{}", "x".repeat(500), "OVERFLOW");
        let prompt = build_prompt(&article(&body));
        assert!(prompt.contains(&format!("CONTENT: {}...", "x".repeat(500))));
        assert!(!prompt.contains("OVERFLOW"));
    }

    #[test]
    fn test_prompt_truncation_respects_multibyte_chars() {
        let body = "é".repeat(600);
        let prompt = build_prompt(&article(&body));
        assert!(prompt.contains(&format!("CONTENT: {}...", "é".repeat(500))));
    }

    #[test]
    fn test_prompt_requests_four_key_json_with_enumerations() {
        let prompt = build_prompt(&article(""));
        for key in ["\"sentiment\"", "\"affected_stocks\"", "\"impact_description\"", "\"confidence\""] {
            assert!(prompt.contains(key), "missing {key}");
        }
        assert!(prompt.contains("positive|negative|neutral"));
        assert!(prompt.contains("high|medium|low"));
        assert!(prompt.contains("financial analyst"));
    }
}
