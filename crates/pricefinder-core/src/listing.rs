//! Listing records that flow from the collector through the ranker.
//!
//! All of these are request-scoped: built for one search, serialized into the
//! response, then dropped.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::amount::parse_amount;
use crate::recommendation::{Category, Condition, RecommendationTag};
use crate::store::Store;

/// Rating assumed when a page shows none.
pub const DEFAULT_RATING: f64 = 4.0;

/// One offer scraped from one retailer's search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub store: Store,
    /// Listing title as shown on the page.
    pub raw_name: String,
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    pub price: Decimal,
    /// Absolute product URL with query string and fragment removed.
    pub url: String,
    #[serde(default = "default_rating")]
    pub rating: f64,
}

/// A [`RawListing`] enriched with normalization and a recommendation.
///
/// Deserialization is lenient so that model output with missing or oddly
/// typed optional fields still yields a record. `store`, `raw_name`, `price`,
/// `url` and `recommendation_tag` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedListing {
    #[serde(alias = "tienda")]
    pub store: Store,
    #[serde(alias = "nombre_crudo")]
    pub raw_name: String,
    #[serde(
        alias = "precio",
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "deserialize_amount"
    )]
    pub price: Decimal,
    pub url: String,
    #[serde(
        alias = "reviews",
        default = "default_rating",
        deserialize_with = "deserialize_rating"
    )]
    pub rating: f64,
    #[serde(alias = "nombre_normalizado", default)]
    pub normalized_name: String,
    #[serde(alias = "categoria", default)]
    pub category: Category,
    #[serde(alias = "condicion", default)]
    pub condition: Condition,
    #[serde(alias = "especificaciones_detectadas", default)]
    pub detected_specs: Vec<String>,
    #[serde(alias = "recomendacion", alias = "recommendation")]
    pub recommendation_tag: RecommendationTag,
    #[serde(alias = "razon", default)]
    pub reason: String,
    #[serde(alias = "valor_score", default, deserialize_with = "deserialize_score")]
    pub value_score: u8,
    #[serde(
        alias = "precio_vs_promedio",
        default,
        deserialize_with = "deserialize_percentage"
    )]
    pub price_vs_average: String,
}

/// Aggregate price figures over the products of one [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub average_price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub min_price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub max_price: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price_range: Decimal,
    pub total_count: usize,
    pub best_option_count: usize,
    pub good_alternative_count: usize,
    pub consider_count: usize,
    pub not_recommended_count: usize,
}

impl Statistics {
    /// Number of listings carrying `tag`.
    #[must_use]
    pub fn count_for(&self, tag: RecommendationTag) -> usize {
        match tag {
            RecommendationTag::BestOption => self.best_option_count,
            RecommendationTag::GoodAlternative => self.good_alternative_count,
            RecommendationTag::Consider => self.consider_count,
            RecommendationTag::NotRecommended => self.not_recommended_count,
        }
    }
}

/// The ranked comparison returned for one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub insights: Vec<String>,
    pub products: Vec<RankedListing>,
    /// `None` when `products` is empty; serialized as `{}`.
    #[serde(serialize_with = "serialize_statistics")]
    pub statistics: Option<Statistics>,
    /// `"model:<id>"` or `"heuristic"`.
    pub ranked_by: String,
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

fn serialize_statistics<S: Serializer>(
    statistics: &Option<Statistics>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    match statistics {
        Some(stats) => stats.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Exact(Decimal),
    Text(String),
}

/// Accepts `129.99`, `"129.99"` and `"$1,299.99"`; rejects negatives.
fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = match AmountRepr::deserialize(deserializer)? {
        AmountRepr::Exact(value) => value,
        AmountRepr::Text(text) => parse_amount(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable amount \"{text}\"")))?,
    };
    if value.is_sign_negative() {
        return Err(serde::de::Error::custom("amount must not be negative"));
    }
    Ok(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Null(()),
}

impl LooseNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(text) => crate::amount::parse_leading_number(text),
            LooseNumber::Null(()) => None,
        }
    }
}

fn deserialize_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(LooseNumber::deserialize(deserializer)?
        .as_f64()
        .unwrap_or(DEFAULT_RATING))
}

/// Clamps whatever the model sent into `0..=100`.
fn deserialize_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = LooseNumber::deserialize(deserializer)?.as_f64().unwrap_or(0.0);
    let clamped = Decimal::try_from(raw.clamp(0.0, 100.0))
        .unwrap_or_default()
        .round();
    Ok(clamped.to_u8().unwrap_or(0))
}

/// Keeps strings as-is and renders bare numbers as a signed percentage.
fn deserialize_percentage<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Text(text) => text,
        LooseNumber::Number(n) => format!("{n:+.1}%"),
        LooseNumber::Null(()) => String::new(),
    })
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
