//! Turns a retailer search page into [`RawListing`]s.

use pricefinder_core::{parse_amount, parse_leading_number, RawListing, DEFAULT_RATING};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ScraperError;
use crate::sites::{ExtractionRule, SiteProfile};

struct CompiledRule {
    container: Selector,
    name: Vec<Selector>,
    price: Vec<Selector>,
    link: Vec<Selector>,
    rating: Vec<Selector>,
}

impl CompiledRule {
    fn compile(rule: &ExtractionRule) -> Result<Self, ScraperError> {
        Ok(Self {
            container: parse_selector(rule.container)?,
            name: parse_all(rule.name)?,
            price: parse_all(rule.price)?,
            link: parse_all(rule.link)?,
            rating: parse_all(rule.rating)?,
        })
    }
}

fn parse_all(selectors: &[&str]) -> Result<Vec<Selector>, ScraperError> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

/// First element matched by the earliest selector in `selectors` that matches
/// anything inside `card`.
fn first_match<'a>(card: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| card.select(selector).next())
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

/// Extracts up to `max` listings from `html` using the profile's rules.
///
/// The first rule whose container selector matches at least one element is
/// used, even if none of its candidates turn out to be valid. Candidates
/// missing a name, a parseable price, or a link are skipped. Listings keep
/// document order.
#[must_use]
pub fn extract_listings(profile: &SiteProfile, html: &str, max: usize) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    let Ok(base) = Url::parse(profile.origin) else {
        tracing::warn!(site = %profile.store, origin = profile.origin, "site origin does not parse");
        return Vec::new();
    };

    for (index, rule) in profile.rules.iter().enumerate() {
        let compiled = match CompiledRule::compile(rule) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::warn!(site = %profile.store, rule = index, error = %e, "skipping rule");
                continue;
            }
        };

        let containers: Vec<ElementRef<'_>> = document.select(&compiled.container).collect();
        if containers.is_empty() {
            continue;
        }

        let listings: Vec<RawListing> = containers
            .into_iter()
            .filter_map(|card| extract_card(profile, &compiled, &base, card))
            .take(max)
            .collect();
        tracing::debug!(
            site = %profile.store,
            rule = index,
            count = listings.len(),
            "extraction rule matched"
        );
        return listings;
    }

    tracing::debug!(site = %profile.store, "no extraction rule matched");
    Vec::new()
}

fn extract_card(
    profile: &SiteProfile,
    rule: &CompiledRule,
    base: &Url,
    card: ElementRef<'_>,
) -> Option<RawListing> {
    let raw_name = first_match(card, &rule.name).map(element_text)?;
    if raw_name.is_empty() || profile.is_placeholder(&raw_name) {
        return None;
    }

    let price_text = first_match(card, &rule.price).map(element_text)?;
    let price = parse_amount(&price_text)?;

    let href = first_match(card, &rule.link)?.value().attr("href")?;
    let url = resolve_link(base, href)?;

    let rating = first_match(card, &rule.rating)
        .and_then(|node| {
            let text = element_text(node);
            parse_leading_number(&text)
                .or_else(|| node.value().attr("aria-label").and_then(parse_leading_number))
        })
        .filter(|r| (0.0..=5.0).contains(r))
        .unwrap_or(DEFAULT_RATING);

    Some(RawListing {
        store: profile.store,
        raw_name,
        price,
        url,
        rating,
    })
}

/// Element text with whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves `href` against the site origin and drops query and fragment.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
