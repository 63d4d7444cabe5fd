//! The canonical product record shared by the marketplace client and the
//! persistence layer.

use serde::{Deserialize, Serialize};

/// A normalized product record, independent of which upstream payload variant
/// (search result or full product detail) produced it.
///
/// `asin` and `title` are always present. Every other field is `Option`:
/// `None` means "the upstream payload did not supply this field", which the
/// reconciliation write path interprets as "leave the stored value untouched".
/// Fields never regress to a default just because one payload variant is
/// sparser than the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub asin: String,
    pub title: String,
    /// Parsed out of free-text price strings upstream; `Some(0.0)` is a real
    /// observation of a zero price and is distinct from `None`.
    pub price: Option<f64>,
    /// 3-letter currency code; defaults to `"USD"` on first persistence.
    pub currency: Option<String>,
    /// 0–5 star average as reported upstream.
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub availability: Option<bool>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    /// Length-capped upstream: 500 chars for search-derived records,
    /// 1000 for detail-derived ones.
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    /// Free-form key/value mapping (e.g. `{"Height": "4.3 inches"}`),
    /// persisted as JSONB without further interpretation.
    pub dimensions: Option<serde_json::Value>,
    pub weight: Option<f64>,
}

impl CanonicalProduct {
    /// A record carrying only the identity fields, with everything else
    /// absent. Useful as a starting point in tests and manual construction.
    #[must_use]
    pub fn bare(asin: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            asin: asin.into(),
            title: title.into(),
            price: None,
            currency: None,
            rating: None,
            review_count: None,
            category: None,
            brand: None,
            availability: None,
            image_url: None,
            product_url: None,
            description: None,
            features: None,
            dimensions: None,
            weight: None,
        }
    }
}
