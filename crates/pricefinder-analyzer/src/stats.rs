use pricefinder_core::{RankedListing, RecommendationTag, Statistics};
use rust_decimal::Decimal;

const MONEY_DP: u32 = 2;

/// Aggregate price statistics over `products`; `None` when empty.
///
/// Monetary values are rounded to cents with banker's rounding.
#[must_use]
pub fn compute_statistics(products: &[RankedListing]) -> Option<Statistics> {
    let first = products.first()?;

    let mut sum = Decimal::ZERO;
    let mut min = first.price;
    let mut max = first.price;
    for product in products {
        sum += product.price;
        min = min.min(product.price);
        max = max.max(product.price);
    }
    let average = sum / Decimal::from(products.len());

    let count = |tag: RecommendationTag| {
        products
            .iter()
            .filter(|p| p.recommendation_tag == tag)
            .count()
    };

    Some(Statistics {
        average_price: average.round_dp(MONEY_DP),
        min_price: min.round_dp(MONEY_DP),
        max_price: max.round_dp(MONEY_DP),
        price_range: (max - min).round_dp(MONEY_DP),
        total_count: products.len(),
        best_option_count: count(RecommendationTag::BestOption),
        good_alternative_count: count(RecommendationTag::GoodAlternative),
        consider_count: count(RecommendationTag::Consider),
        not_recommended_count: count(RecommendationTag::NotRecommended),
    })
}
