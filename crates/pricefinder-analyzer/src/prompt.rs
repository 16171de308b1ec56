use pricefinder_core::{RawListing, RecommendationTag};

use crate::error::AnalyzerError;

/// Builds the ranking prompt for `query` over `listings`.
///
/// The reply is asked for as bare JSON whose product fields match
/// [`pricefinder_core::RankedListing`], so it can be deserialized directly.
///
/// # Errors
///
/// Returns [`AnalyzerError::Deserialize`] if the listings cannot be rendered
/// as JSON.
pub fn build_prompt(query: &str, listings: &[RawListing]) -> Result<String, AnalyzerError> {
    let listings_json =
        serde_json::to_string_pretty(listings).map_err(|e| AnalyzerError::Deserialize {
            context: "rendering listings for prompt".to_owned(),
            source: e,
        })?;

    let best = RecommendationTag::BestOption.label();
    let good = RecommendationTag::GoodAlternative.label();
    let consider = RecommendationTag::Consider.label();
    let not_recommended = RecommendationTag::NotRecommended.label();

    Ok(format!(
        r#"Analyze these product listings and return ONLY valid JSON (no extra text).

SEARCHED PRODUCT: {query}

LISTINGS:
{listings_json}

Return JSON with exactly this structure:
{{
  "summary": "One or two sentences with the main recommendation and the % saved",
  "insights": [
    "Observation about prices",
    "Observation about value",
    "Observation about the recommendation"
  ],
  "products": [
    {{
      "store": "store exactly as given",
      "raw_name": "name exactly as given",
      "normalized_name": "Clean product name",
      "price": 0.0,
      "url": "url exactly as given",
      "rating": 4.0,
      "category": "Identical | Similar | Alternative | Different",
      "condition": "New | Refurbished | Used | Unknown",
      "detected_specs": ["spec"],
      "recommendation_tag": "{best}",
      "reason": "Short reason",
      "value_score": 85,
      "price_vs_average": "-15.0%"
    }}
  ]
}}

RULES:
- Include one entry in "products" for every listing, in the same order.
- "{best}" = lowest price among comparable products
- "{good}" = competitive price
- "{consider}" = elevated but justifiable price
- "{not_recommended}" = excessive price
- "category" says how closely the listing matches the searched product.
- "value_score" is an integer from 0 to 100.
- "price_vs_average" is the signed percentage difference from the average price.
- Write exactly 3 useful insights."#
    ))
}
