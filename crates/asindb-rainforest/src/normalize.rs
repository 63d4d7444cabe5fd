//! Normalization of the two upstream payload variants into
//! [`CanonicalProduct`], plus review aggregation.
//!
//! Both converters are tagged-variant parsers feeding one shared record
//! shape. They return `None` only when the payload carries no usable ASIN;
//! every other missing field simply stays `None` on the canonical record so
//! the reconciliation layer can apply partial-update semantics.

use asindb_core::CanonicalProduct;

use crate::parse::{extract_decimal, truncate_chars, value_text};
use crate::types::{
    CategoryField, PriceField, ProductPayload, Review, ReviewSummary, SearchResultItem,
};

/// Description cap for records derived from search results (the title doubles
/// as a short description there).
const SEARCH_DESCRIPTION_CAP: usize = 500;
/// Description cap for records derived from full product details.
const DETAIL_DESCRIPTION_CAP: usize = 1000;
/// How many raw reviews a summary retains.
const RETAINED_REVIEWS: usize = 5;

fn price_value(price: Option<&PriceField>) -> Option<f64> {
    price
        .and_then(|p| p.value.as_ref())
        .map(|v| extract_decimal(&value_text(v)))
}

fn price_currency(price: Option<&PriceField>) -> String {
    price
        .and_then(|p| p.currency.clone())
        .unwrap_or_else(|| "USD".to_string())
}

/// Converts one `search` result item into a canonical record.
///
/// Returns `None` when the item fails even the lenient parse or carries no
/// ASIN — the caller drops that single item and keeps the rest of the page.
#[must_use]
pub fn canonical_from_search_item(value: &serde_json::Value) -> Option<CanonicalProduct> {
    let item: SearchResultItem = serde_json::from_value(value.clone()).ok()?;
    let asin = item.asin.filter(|a| !a.is_empty())?;
    let title = item.title.unwrap_or_default();
    let price = price_value(item.price.as_ref());
    let currency = price_currency(item.price.as_ref());

    Some(CanonicalProduct {
        asin,
        description: Some(truncate_chars(&title, SEARCH_DESCRIPTION_CAP).to_string()),
        title,
        price,
        currency: Some(currency),
        rating: item.rating,
        review_count: item.ratings_total.map(|n| i32::try_from(n).unwrap_or(0)),
        category: item.department.and_then(CategoryField::into_name),
        brand: item.brand,
        // Prime eligibility is the only availability signal the search
        // payload carries; unknown counts as available.
        availability: Some(item.is_prime.unwrap_or(true)),
        image_url: item.image,
        product_url: item.link,
        features: None,
        dimensions: None,
        weight: None,
    })
}

/// Converts a full `product` detail payload into a canonical record.
#[must_use]
pub fn canonical_from_product(value: &serde_json::Value) -> Option<CanonicalProduct> {
    let payload: ProductPayload = serde_json::from_value(value.clone()).ok()?;
    let asin = payload.asin.filter(|a| !a.is_empty())?;

    let buybox_price = payload.buybox_winner.as_ref().and_then(|b| b.price.as_ref());
    let price = price_value(buybox_price);
    let currency = price_currency(buybox_price);

    let availability_raw = payload
        .availability
        .and_then(|a| a.raw)
        .unwrap_or_default();

    Some(CanonicalProduct {
        asin,
        title: payload.title.unwrap_or_default(),
        price,
        currency: Some(currency),
        rating: payload.rating,
        review_count: payload.ratings_total.map(|n| i32::try_from(n).unwrap_or(0)),
        category: payload.category.and_then(CategoryField::into_name),
        brand: payload.brand,
        availability: Some(availability_raw != "Currently unavailable"),
        image_url: payload.main_image.and_then(|i| i.link),
        product_url: payload.link,
        description: payload
            .description
            .map(|d| truncate_chars(&d, DETAIL_DESCRIPTION_CAP).to_string()),
        features: payload.feature_bullets,
        dimensions: payload.dimensions,
        weight: payload
            .weight
            .map(|w| extract_decimal(&value_text(&w))),
    })
}

/// Aggregates a raw `reviews` array into a [`ReviewSummary`].
///
/// `total_reviews` counts every fetched review; the retained list is capped
/// at five. A review that fails the lenient parse still counts toward the
/// total and contributes a zero rating to the mean, mirroring how upstream
/// reports partially filled review objects.
#[must_use]
pub fn summarize_reviews(values: &[serde_json::Value]) -> ReviewSummary {
    let parsed: Vec<Review> = values
        .iter()
        .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
        .collect();

    let rating_sum: f64 = parsed.iter().filter_map(|r| r.rating).sum();
    // max(len, 1) guards the zero-review case against a division fault.
    let divisor = u32::try_from(values.len().max(1)).unwrap_or(u32::MAX);
    let average = rating_sum / f64::from(divisor);
    let average_rating = (average * 10.0).round() / 10.0;

    ReviewSummary {
        total_reviews: i64::try_from(values.len()).unwrap_or(i64::MAX),
        average_rating,
        reviews: parsed.into_iter().take(RETAINED_REVIEWS).collect(),
    }
}
