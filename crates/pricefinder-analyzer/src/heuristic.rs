//! Price-only ranking used when no model is available.
//!
//! Tags follow a fixed ladder against the batch average:
//!
//! | condition                  | tag                 |
//! |----------------------------|---------------------|
//! | price == min               | Best Option         |
//! | price <= average           | Good Alternative    |
//! | price <= average × 1.15    | Consider            |
//! | otherwise                  | Not Recommended     |

use pricefinder_core::{
    AnalysisResult, Category, Condition, RankedListing, RawListing, RecommendationTag,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::stats::compute_statistics;

pub const RANKED_BY: &str = "heuristic";

/// Ranks `listings` by price alone. Output order matches input order.
///
/// Returns an empty result for an empty batch; callers reject that case
/// before getting here.
#[must_use]
pub fn rank_by_price(listings: &[RawListing], query: &str) -> AnalysisResult {
    let Some(first) = listings.first() else {
        return AnalysisResult {
            summary: String::new(),
            insights: Vec::new(),
            products: Vec::new(),
            statistics: None,
            ranked_by: RANKED_BY.to_owned(),
        };
    };

    let mut min = first;
    let mut max = first;
    let mut sum = Decimal::ZERO;
    for listing in listings {
        sum += listing.price;
        if listing.price < min.price {
            min = listing;
        }
        if listing.price > max.price {
            max = listing;
        }
    }
    let average = sum / Decimal::from(listings.len());
    let consider_ceiling = average * Decimal::new(115, 2);

    let products: Vec<RankedListing> = listings
        .iter()
        .map(|listing| {
            let deviation = deviation_pct(listing.price, average);
            let tag = if listing.price == min.price {
                RecommendationTag::BestOption
            } else if listing.price <= average {
                RecommendationTag::GoodAlternative
            } else if listing.price <= consider_ceiling {
                RecommendationTag::Consider
            } else {
                RecommendationTag::NotRecommended
            };

            RankedListing {
                store: listing.store,
                raw_name: listing.raw_name.clone(),
                price: listing.price,
                url: listing.url.clone(),
                rating: listing.rating,
                normalized_name: listing.raw_name.clone(),
                category: Category::Similar,
                condition: Condition::New,
                detected_specs: Vec::new(),
                recommendation_tag: tag,
                reason: reason_for(tag, deviation),
                value_score: value_score(tag, deviation),
                price_vs_average: format_deviation(deviation),
            }
        })
        .collect();

    let savings = max.price - min.price;
    let savings_pct = if max.price.is_zero() {
        Decimal::ZERO
    } else {
        savings / max.price * Decimal::ONE_HUNDRED
    };
    let statistics = compute_statistics(&products);
    let recommended = statistics.as_ref().map_or(0, |stats| {
        stats.count_for(RecommendationTag::BestOption)
            + stats.count_for(RecommendationTag::GoodAlternative)
    });

    let summary = format!(
        "Best price for \"{query}\" is at {store}: ${price:.2}, saving ${savings:.2} ({pct:.1}%) versus the most expensive listing.",
        store = min.store.display_name(),
        price = min.price.round_dp(2),
        savings = savings.round_dp(2),
        pct = savings_pct.round_dp(1),
    );
    let insights = vec![
        format!(
            "Buying at {} instead of {} saves ${:.2} ({:.1}%).",
            min.store.display_name(),
            max.store.display_name(),
            savings.round_dp(2),
            savings_pct.round_dp(1),
        ),
        format!(
            "The average price across {} listings is ${:.2}.",
            listings.len(),
            average.round_dp(2),
        ),
        format!(
            "{recommended} of {} listings are priced at or below average.",
            listings.len()
        ),
    ];

    AnalysisResult {
        summary,
        insights,
        products,
        statistics,
        ranked_by: RANKED_BY.to_owned(),
    }
}

/// `(price - average) / average × 100`, or 0 when the average is 0.
fn deviation_pct(price: Decimal, average: Decimal) -> Decimal {
    if average.is_zero() {
        return Decimal::ZERO;
    }
    (price - average) / average * Decimal::ONE_HUNDRED
}

fn value_score(tag: RecommendationTag, deviation: Decimal) -> u8 {
    if tag == RecommendationTag::BestOption {
        return 100;
    }
    let penalty = deviation.abs().round().min(Decimal::ONE_HUNDRED);
    (Decimal::ONE_HUNDRED - penalty).to_u8().unwrap_or(0)
}

/// Signed percentage with one decimal, e.g. `"+20.0%"` or `"-7.5%"`.
fn format_deviation(deviation: Decimal) -> String {
    let rounded = deviation.round_dp(1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{rounded:.1}%")
    } else {
        format!("+{:.1}%", rounded.abs())
    }
}

fn reason_for(tag: RecommendationTag, deviation: Decimal) -> String {
    let pct = deviation.abs().round_dp(1);
    match tag {
        RecommendationTag::BestOption => "Lowest price found across all stores.".to_owned(),
        RecommendationTag::GoodAlternative => format!("{pct:.1}% below the average price."),
        RecommendationTag::Consider => format!("{pct:.1}% above the average price."),
        RecommendationTag::NotRecommended => {
            format!("{pct:.1}% above the average price; better offers exist.")
        }
    }
}
