use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use asindb_core::CanonicalProduct;
use asindb_db::ProductRow;
use asindb_rainforest::{ReviewSummary, Upstream};

use crate::middleware::RequestId;
use crate::sync;

use super::{map_db_error, map_sync_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

/// Price-history responses are capped regardless of how much history exists.
const PRICE_HISTORY_CAP: i64 = 100;
const MAX_SEARCH_PAGES: u8 = 3;

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    id: i64,
    asin: String,
    title: String,
    price: Option<Decimal>,
    currency: String,
    rating: Option<f64>,
    review_count: i32,
    category: Option<String>,
    brand: Option<String>,
    availability: bool,
    image_url: Option<String>,
    product_url: Option<String>,
    description: Option<String>,
    features: Option<serde_json::Value>,
    dimensions: Option<serde_json::Value>,
    weight: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            asin: row.asin,
            title: row.title,
            price: row.price,
            currency: row.currency,
            rating: row.rating,
            review_count: row.review_count,
            category: row.category,
            brand: row.brand,
            availability: row.availability,
            image_url: row.image_url,
            product_url: row.product_url,
            description: row.description,
            features: row.features,
            dimensions: row.dimensions,
            weight: row.weight,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PriceHistoryItem {
    price: Decimal,
    currency: String,
    observed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

/// Direct-creation payload. `asin` and `title` are required; everything else
/// mirrors the canonical record.
#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub asin: String,
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability: Option<bool>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<serde_json::Value>,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl CreateProductRequest {
    fn into_canonical(self) -> CanonicalProduct {
        CanonicalProduct {
            asin: self.asin.trim().to_string(),
            title: self.title,
            price: self.price,
            currency: self.currency,
            rating: self.rating,
            review_count: self.review_count,
            category: self.category,
            brand: self.brand,
            availability: self.availability,
            image_url: self.image_url,
            product_url: self.product_url,
            description: self.description,
            features: self.features,
            dimensions: self.dimensions,
            weight: self.weight,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub query: String,
    pub pages: Option<u8>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchBody {
    query: String,
    total_results: usize,
    products: Vec<CanonicalProduct>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let rows = asindb_db::list_products(
        &state.pool,
        asindb_db::ProductListFilters {
            category: query.category.as_deref(),
            skip: query.skip.unwrap_or(0).max(0),
            limit: normalize_limit(query.limit),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ProductItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductItem>>), ApiError> {
    if payload.asin.trim().is_empty() || payload.title.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "asin and title must be non-empty",
        ));
    }

    let record = payload.into_canonical();
    let row = asindb_db::insert_product(&state.pool, &record)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ProductItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(asin): Path<String>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let row = asindb_db::get_product(&state.pool, &asin)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "product not found"))?;

    Ok(Json(ApiResponse {
        data: ProductItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_price_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(asin): Path<String>,
) -> Result<Json<ApiResponse<Vec<PriceHistoryItem>>>, ApiError> {
    let rows = asindb_db::list_price_history(&state.pool, &asin, PRICE_HISTORY_CAP)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| PriceHistoryItem {
            price: row.price,
            currency: row.currency,
            observed_at: row.observed_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search_marketplace(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchBody>>, ApiError> {
    let term = query.query.trim();
    if term.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query must be non-empty",
        ));
    }

    let pages = query.pages.unwrap_or(1);
    if pages == 0 || pages > MAX_SEARCH_PAGES {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "pages must be between 1 and 3",
        ));
    }

    // Unavailable upstream degrades to an empty result list, not an error.
    let products = state
        .marketplace
        .search_products(term, pages)
        .await
        .unwrap_or_default();

    Ok(Json(ApiResponse {
        data: SearchBody {
            query: term.to_string(),
            total_results: products.len(),
            products,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn sync_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(asin): Path<String>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let row = sync::sync_product(&state.pool, &state.marketplace, &asin)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ProductItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_with_fallback(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(asin): Path<String>,
) -> Result<Json<ApiResponse<ProductItem>>, ApiError> {
    let row = sync::get_with_fallback(&state.pool, &state.marketplace, &asin)
        .await
        .map_err(|e| map_sync_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ProductItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(asin): Path<String>,
) -> Json<ApiResponse<ReviewSummary>> {
    // An unconfigured or unreachable provider yields the zero summary.
    let summary = match state.marketplace.product_reviews(&asin).await {
        Upstream::Fetched(summary) => summary,
        Upstream::Unavailable => ReviewSummary::default(),
    };

    Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    })
}
