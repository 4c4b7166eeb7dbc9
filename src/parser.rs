//! Extraction of a [`Classification`] from raw completion text.
//!
//! Models often wrap their JSON in prose or code fences, so the parser takes
//! the span from the first `{` to the last `}` and decodes only that. Missing
//! keys fall back to defaults; values are lower-cased but never checked
//! against the documented enumerations.

use crate::error::{ParseError, ParseResult};
use crate::models::Classification;
use crate::utils::truncate_for_log;
use serde_json::{Map, Value};
use tracing::warn;

const DEFAULT_SENTIMENT: &str = "neutral";
const DEFAULT_CONFIDENCE: &str = "medium";

/// Parse a completion, falling back to the degraded classification on any error.
pub fn parse_response(raw: &str) -> Classification {
    match try_parse(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(raw, 300),
                "Failed to parse AI response"
            );
            Classification::degraded_parse()
        }
    }
}

/// Parse a completion, reporting why it could not be used.
pub fn try_parse(raw: &str) -> ParseResult<Classification> {
    let obj = extract_object(raw)?;

    let sentiment = optional_str(&obj, "sentiment")?
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_SENTIMENT.to_string());
    let affected_stocks = stock_list(&obj)?;
    let impact_description = optional_str(&obj, "impact_description")?
        .unwrap_or_default()
        .to_string();
    let confidence = optional_str(&obj, "confidence")?
        .map(str::to_lowercase)
        .unwrap_or_else(|| DEFAULT_CONFIDENCE.to_string());

    Ok(Classification {
        sentiment,
        affected_stocks,
        impact_description,
        confidence,
    })
}

fn extract_object(raw: &str) -> ParseResult<Map<String, Value>> {
    let start = raw.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    match serde_json::from_str::<Value>(&raw[start..=end])? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

/// A string field; absent and `null` both read as `None`.
fn optional_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> ParseResult<Option<&'a str>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ParseError::WrongType { field }),
    }
}

/// `affected_stocks` as given by the model. A bare string is treated as a
/// single entry; non-string array items keep their JSON text.
fn stock_list(obj: &Map<String, Value>) -> ParseResult<Vec<String>> {
    match obj.get("affected_stocks") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(_) => Err(ParseError::WrongType {
            field: "affected_stocks",
        }),
    }
}
