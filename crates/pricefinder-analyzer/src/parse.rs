//! Turns the model's free-text reply into structured records.
//!
//! Models wrap JSON in code fences or add chatter around it. Parsing tries,
//! in order, the span from the first `{` to the last `}` and then the whole
//! cleaned text; the first attempt that yields a JSON object wins.

use pricefinder_core::RankedListing;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AnalyzerError;

const MAX_INSIGHTS: usize = 3;

/// The model's reply, minus statistics (which are always recomputed locally).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub summary: String,
    pub insights: Vec<String>,
    pub products: Vec<RankedListing>,
}

#[derive(Debug, Deserialize)]
struct ReplyShape {
    #[serde(default, alias = "resumen")]
    summary: Option<Value>,
    #[serde(default)]
    insights: Option<Value>,
    #[serde(default, alias = "productos")]
    products: Option<Value>,
}

/// Parses a model reply.
///
/// Product records that fail to deserialize are skipped with a warning.
///
/// # Errors
///
/// - [`AnalyzerError::EmptyResponse`] when `text` is blank.
/// - [`AnalyzerError::MalformedResponse`] when no JSON object can be parsed.
/// - [`AnalyzerError::NoProducts`] when no valid product record remains.
pub fn parse_reply(text: &str) -> Result<ParsedReply, AnalyzerError> {
    let cleaned = strip_code_fence(text);
    if cleaned.is_empty() {
        return Err(AnalyzerError::EmptyResponse);
    }

    let shape = parse_braced_span(cleaned).or_else(|first| {
        tracing::debug!(error = %first, "braced span did not parse, trying whole reply");
        parse_object(cleaned)
    })?;

    let summary = match shape.summary {
        Some(Value::String(s)) => s.trim().to_owned(),
        _ => String::new(),
    };

    let insights: Vec<String> = match shape.insights {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
                _ => None,
            })
            .take(MAX_INSIGHTS)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_owned()],
        _ => Vec::new(),
    };

    let records = match shape.products {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let total = records.len();
    let products: Vec<RankedListing> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping invalid product record");
                None
            }
        })
        .collect();

    if products.is_empty() {
        return Err(AnalyzerError::NoProducts);
    }
    if products.len() < total {
        tracing::info!(
            kept = products.len(),
            total,
            "some product records were dropped"
        );
    }

    Ok(ParsedReply {
        summary,
        insights,
        products,
    })
}

/// Trims the reply and removes a surrounding Markdown code fence
/// (` ``` ` or ` ```json `), if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest
        .split_once('\n')
        .map_or_else(|| rest.trim_start_matches("json"), |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn parse_braced_span(text: &str) -> Result<ReplyShape, AnalyzerError> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => parse_object(&text[start..=end]),
        _ => Err(AnalyzerError::MalformedResponse(
            "no JSON object delimiters found".to_owned(),
        )),
    }
}

fn parse_object(text: &str) -> Result<ReplyShape, AnalyzerError> {
    serde_json::from_str::<ReplyShape>(text)
        .map_err(|e| AnalyzerError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
