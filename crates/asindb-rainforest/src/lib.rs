//! HTTP client for the Rainforest product-data API.
//!
//! One endpoint, three request types (`search`, `product`, `reviews`),
//! authenticated by a query-string API key. Heterogeneous upstream payload
//! shapes are normalized into [`asindb_core::CanonicalProduct`]; every
//! public operation degrades to [`Upstream::Unavailable`] instead of
//! surfacing transport faults.

mod client;
mod error;
mod normalize;
mod parse;
mod types;

pub use client::RainforestClient;
pub use error::RainforestError;
pub use normalize::{canonical_from_product, canonical_from_search_item, summarize_reviews};
pub use parse::{extract_decimal, truncate_chars};
pub use types::{Review, ReviewSummary, Upstream};
