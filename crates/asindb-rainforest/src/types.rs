//! Upstream payload shapes and the degrade-to-empty result type.
//!
//! Payload structs are deliberately lenient: every field beyond the ASIN is
//! optional with a serde default, so a sparse or slightly malformed payload
//! still deserializes. Items that fail even this lenient parse are dropped
//! one at a time, never failing a whole response.

use serde::{Deserialize, Serialize};

/// Result of an upstream operation under the degrade-to-empty policy.
///
/// `Unavailable` covers both "no API key configured" and "the provider could
/// not be reached"; call sites must decide what the documented empty value
/// is for their operation rather than having an error raised past them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Upstream<T> {
    /// Payload from a live upstream response.
    Fetched(T),
    /// The provider was not consulted or did not answer.
    Unavailable,
}

impl<T> Upstream<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Upstream::Fetched(value) => Some(value),
            Upstream::Unavailable => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Upstream::Fetched(value) => value,
            Upstream::Unavailable => default,
        }
    }
}

impl<T: Default> Upstream<T> {
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or(T::default())
    }
}

/// A single retained review, parsed leniently from the raw reviews payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Aggregated review data for one product.
///
/// `total_reviews` counts every fetched review; `reviews` retains only the
/// first five. `average_rating` is 0.0 when there are no reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub reviews: Vec<Review>,
}

// ---------------------------------------------------------------------------
// Raw payload shapes
// ---------------------------------------------------------------------------

/// Price object as it appears in both payload variants.
///
/// `value` arrives as either a JSON number or a string with currency
/// decoration; [`crate::extract_decimal`] handles both.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PriceField {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A category/department reference: sometimes a bare string, sometimes an
/// object carrying a `name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum CategoryField {
    Named {
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl CategoryField {
    pub(crate) fn into_name(self) -> Option<String> {
        match self {
            CategoryField::Named { name } => name,
            CategoryField::Plain(name) => Some(name),
        }
    }
}

/// One item of a `search` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResultItem {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<PriceField>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_total: Option<i64>,
    #[serde(default)]
    pub department: Option<CategoryField>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub is_prime: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuyboxWinner {
    #[serde(default)]
    pub price: Option<PriceField>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AvailabilityField {
    #[serde(default)]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ImageField {
    #[serde(default)]
    pub link: Option<String>,
}

/// The full-detail `product` payload.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProductPayload {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub buybox_winner: Option<BuyboxWinner>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_total: Option<i64>,
    #[serde(default)]
    pub category: Option<CategoryField>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability: Option<AvailabilityField>,
    #[serde(default)]
    pub main_image: Option<ImageField>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub feature_bullets: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<serde_json::Value>,
    /// Free text like `"1.2 pounds"`; occasionally a bare number.
    #[serde(default)]
    pub weight: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_into_option() {
        assert_eq!(Upstream::Fetched(7).into_option(), Some(7));
        assert_eq!(Upstream::<i32>::Unavailable.into_option(), None);
    }

    #[test]
    fn upstream_unwrap_or_default() {
        let fetched: Upstream<Vec<i32>> = Upstream::Fetched(vec![1]);
        assert_eq!(fetched.unwrap_or_default(), vec![1]);
        let unavailable: Upstream<Vec<i32>> = Upstream::Unavailable;
        assert_eq!(unavailable.unwrap_or_default(), Vec::<i32>::new());
    }

    #[test]
    fn category_field_accepts_both_shapes() {
        let named: CategoryField =
            serde_json::from_value(serde_json::json!({"name": "Electronics"})).expect("named");
        assert_eq!(named.into_name().as_deref(), Some("Electronics"));

        let plain: CategoryField =
            serde_json::from_value(serde_json::json!("Kitchen")).expect("plain");
        assert_eq!(plain.into_name().as_deref(), Some("Kitchen"));
    }
}
