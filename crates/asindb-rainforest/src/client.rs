//! The Rainforest API client proper.
//!
//! All three operations share one endpoint and differ only in the `type`
//! query parameter and the params that ride along with it. Requests are
//! single-attempt with a fixed timeout; faults degrade per the policy
//! documented on [`Upstream`].

use std::time::Duration;

use reqwest::{Client, Url};

use asindb_core::{CanonicalProduct, Marketplace};

use crate::error::RainforestError;
use crate::normalize::{canonical_from_product, canonical_from_search_item, summarize_reviews};
use crate::types::{ReviewSummary, Upstream};

const DEFAULT_BASE_URL: &str = "https://api.rainforestapi.com/request";
/// Upstream search result pages are requested one at a time, at most this many.
const MAX_SEARCH_PAGES: u8 = 3;
/// Only the head of each search page is normalized; the tail is noise for
/// this system's purposes.
const PAGE_RESULT_CAP: usize = 10;

/// Client for the Rainforest product-data API.
///
/// Holds the HTTP client, the (optional) API key, and the marketplace
/// domain. Use [`RainforestClient::new`] for production or
/// [`RainforestClient::with_base_url`] to point at a mock server in tests.
pub struct RainforestClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    amazon_domain: &'static str,
}

impl RainforestClient {
    /// Creates a new client pointed at the production Rainforest API.
    ///
    /// A missing `api_key` is not an error: the client constructs fine and
    /// every operation reports [`Upstream::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`RainforestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: Option<String>,
        marketplace: Marketplace,
        timeout_secs: u64,
    ) -> Result<Self, RainforestError> {
        Self::with_base_url(api_key, marketplace, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`RainforestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RainforestError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: Option<String>,
        marketplace: Marketplace,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, RainforestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("asindb/0.1 (product-analytics)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|_| RainforestError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            amazon_domain: marketplace.amazon_domain(),
        })
    }

    /// Whether an API key is configured at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Searches the marketplace and normalizes the result items.
    ///
    /// `pages` is clamped to `[1, 3]`; pages are fetched in order and each
    /// contributes at most its first 10 parseable items. A malformed item is
    /// dropped without failing the page. A transport fault on the first page
    /// yields `Unavailable`; on a later page the scan ends with what was
    /// already collected.
    pub async fn search_products(
        &self,
        query: &str,
        pages: u8,
    ) -> Upstream<Vec<CanonicalProduct>> {
        let Some(key) = self.api_key.as_deref() else {
            return Upstream::Unavailable;
        };

        let pages = pages.clamp(1, MAX_SEARCH_PAGES);
        let mut products = Vec::new();

        for page in 1..=pages {
            let url = self.build_url(
                key,
                "search",
                &[("search_term", query), ("page", &page.to_string())],
            );
            let body = match self.request_json(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, query, page, "marketplace search request failed");
                    if page == 1 {
                        return Upstream::Unavailable;
                    }
                    break;
                }
            };

            let items = body
                .get("search_results")
                .and_then(serde_json::Value::as_array)
                .cloned()
                .unwrap_or_default();

            products.extend(
                items
                    .iter()
                    .take(PAGE_RESULT_CAP)
                    .filter_map(canonical_from_search_item),
            );
        }

        Upstream::Fetched(products)
    }

    /// Fetches full product details for one ASIN.
    ///
    /// `Fetched(None)` means upstream answered but knows no such product.
    pub async fn product_details(&self, asin: &str) -> Upstream<Option<CanonicalProduct>> {
        let Some(key) = self.api_key.as_deref() else {
            return Upstream::Unavailable;
        };

        let url = self.build_url(key, "product", &[("asin", asin)]);
        match self.request_json(&url).await {
            Ok(body) => Upstream::Fetched(body.get("product").and_then(canonical_from_product)),
            Err(e) => {
                tracing::warn!(error = %e, asin, "marketplace product request failed");
                Upstream::Unavailable
            }
        }
    }

    /// Fetches and aggregates reviews for one ASIN.
    pub async fn product_reviews(&self, asin: &str) -> Upstream<ReviewSummary> {
        let Some(key) = self.api_key.as_deref() else {
            return Upstream::Unavailable;
        };

        let url = self.build_url(key, "reviews", &[("asin", asin), ("page", "1")]);
        match self.request_json(&url).await {
            Ok(body) => {
                let reviews = body
                    .get("reviews")
                    .and_then(serde_json::Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Upstream::Fetched(summarize_reviews(&reviews))
            }
            Err(e) => {
                tracing::warn!(error = %e, asin, "marketplace reviews request failed");
                Upstream::Unavailable
            }
        }
    }

    /// Builds the full request URL with percent-encoded query parameters.
    fn build_url(&self, key: &str, request_type: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", key);
            pairs.append_pair("type", request_type);
            pairs.append_pair("amazon_domain", self.amazon_domain);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RainforestError::Http`] on network failure or a non-2xx
    /// status, [`RainforestError::Deserialize`] if the body is not JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, RainforestError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RainforestError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}
