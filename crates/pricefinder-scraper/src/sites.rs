//! Per-retailer search URLs and extraction rules.
//!
//! Each [`SiteProfile`] carries an ordered list of [`ExtractionRule`]s.
//! Retailers reshuffle their markup often, so a profile lists the current
//! layout first and older layouts after it; the extractor uses the first rule
//! whose container selector matches anything.

use pricefinder_core::Store;
use url::form_urlencoded;

/// CSS selectors for one layout of a retailer's search results page.
///
/// Field selectors are evaluated inside each container, in list order; the
/// first selector that matches anything supplies the field. An empty rating
/// list means the layout shows no usable rating.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub container: &'static str,
    pub name: &'static [&'static str],
    pub price: &'static [&'static str],
    pub link: &'static [&'static str],
    pub rating: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub store: Store,
    /// Scheme and host that relative result links resolve against.
    pub origin: &'static str,
    /// Path and query prefix; the encoded search terms are appended.
    search_path: &'static str,
    /// Whether the proxy should execute page scripts before returning.
    pub render_js: bool,
    pub rules: &'static [ExtractionRule],
    /// Card titles that are promotional placeholders rather than offers.
    pub placeholder_titles: &'static [&'static str],
}

impl SiteProfile {
    #[must_use]
    pub fn for_store(store: Store) -> &'static SiteProfile {
        match store {
            Store::Amazon => &AMAZON,
            Store::Walmart => &WALMART,
            Store::Ebay => &EBAY,
            Store::BestBuy => &BESTBUY,
            Store::Target => &TARGET,
        }
    }

    /// Search results URL for `query`, form-encoded with spaces as `+`.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{}{encoded}", self.origin, self.search_path)
    }

    pub(crate) fn is_placeholder(&self, title: &str) -> bool {
        self.placeholder_titles
            .iter()
            .any(|p| title.eq_ignore_ascii_case(p))
    }
}

static AMAZON: SiteProfile = SiteProfile {
    store: Store::Amazon,
    origin: "https://www.amazon.com",
    search_path: "/s?k=",
    render_js: false,
    rules: &[
        ExtractionRule {
            container: r#"div[data-component-type="s-search-result"]"#,
            name: &["h2"],
            price: &["span.a-price span.a-offscreen", "span.a-price-whole"],
            link: &["h2 a[href]", "a.a-link-normal[href]"],
            rating: &["span.a-icon-alt"],
        },
        ExtractionRule {
            container: "div.s-result-item[data-asin]",
            name: &["h2", "span.a-text-normal"],
            price: &["span.a-price-whole", "span.a-color-price"],
            link: &["a[href]"],
            rating: &["span.a-icon-alt"],
        },
    ],
    placeholder_titles: &[],
};

static WALMART: SiteProfile = SiteProfile {
    store: Store::Walmart,
    origin: "https://www.walmart.com",
    search_path: "/search?q=",
    render_js: true,
    rules: &[
        ExtractionRule {
            container: "div[data-item-id]",
            name: &[r#"span[data-automation-id="product-title"]"#],
            price: &[
                r#"div[data-automation-id="product-price"] span.w_iUH7"#,
                r#"div[data-automation-id="product-price"]"#,
            ],
            link: &["a[href]"],
            rating: &[r#"span[data-testid="product-ratings"]"#],
        },
        ExtractionRule {
            container: "div.search-result-gridview-item",
            name: &["a.product-title-link span"],
            price: &["span.price-main span.visuallyhidden", "span.price-main"],
            link: &["a.product-title-link[href]"],
            rating: &["span.seo-avg-rating"],
        },
    ],
    placeholder_titles: &[],
};

static EBAY: SiteProfile = SiteProfile {
    store: Store::Ebay,
    origin: "https://www.ebay.com",
    search_path: "/sch/i.html?_nkw=",
    render_js: false,
    rules: &[
        ExtractionRule {
            container: "li.s-item",
            name: &["div.s-item__title", "h3.s-item__title"],
            price: &["span.s-item__price"],
            link: &["a.s-item__link[href]"],
            rating: &["div.x-star-rating span.clipped"],
        },
        ExtractionRule {
            container: "li.s-card",
            name: &["div.s-card__title"],
            price: &["span.s-card__price"],
            link: &["a.su-link[href]", "a[href]"],
            rating: &[],
        },
    ],
    placeholder_titles: &["Shop on eBay"],
};

static BESTBUY: SiteProfile = SiteProfile {
    store: Store::BestBuy,
    origin: "https://www.bestbuy.com",
    search_path: "/site/searchpage.jsp?st=",
    render_js: true,
    rules: &[
        ExtractionRule {
            container: "li.sku-item",
            name: &["h4.sku-title"],
            price: &[r#"div.priceView-customer-price span[aria-hidden="true"]"#],
            link: &["h4.sku-title a[href]", "a[href]"],
            rating: &["div.c-ratings-reviews p.visually-hidden"],
        },
        ExtractionRule {
            container: "li.product-list-item",
            name: &["h2.product-title"],
            price: &["div.customer-price"],
            link: &["a.product-list-item-link[href]", "a[href]"],
            rating: &["span.font-weight-bold"],
        },
    ],
    placeholder_titles: &[],
};

static TARGET: SiteProfile = SiteProfile {
    store: Store::Target,
    origin: "https://www.target.com",
    search_path: "/s?searchTerm=",
    render_js: true,
    rules: &[
        ExtractionRule {
            container: r#"div[data-test="@web/site-top-of-funnel/ProductCardWrapper"]"#,
            name: &[r#"a[data-test="product-title"]"#],
            price: &[r#"span[data-test="current-price"]"#],
            link: &[r#"a[data-test="product-title"][href]"#],
            rating: &[r#"span[data-test="ratings"]"#],
        },
        ExtractionRule {
            container: r#"div[data-test="product-details"]"#,
            name: &[r#"a[data-test="product-title"]"#, "a[href]"],
            price: &[r#"span[data-test="current-price"]"#],
            link: &["a[href]"],
            rating: &[],
        },
    ],
    placeholder_titles: &[],
};
