use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use asindb_db::TopMetric;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_WINDOW_DAYS: i64 = 30;
const DEFAULT_TOP_LIMIT: i64 = 10;
const MAX_TOP_LIMIT: i64 = 50;
const MIN_TREND_DAYS: i64 = 7;
const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Serialize)]
pub(super) struct OverviewBody {
    total_products: i64,
    average_price: Decimal,
    average_rating: Decimal,
    window_revenue: Decimal,
    window_days: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct TopProductItem {
    asin: String,
    title: String,
    price: Option<Decimal>,
    rating: Option<f64>,
    metric: &'static str,
    metric_value: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    date: NaiveDate,
    revenue: Decimal,
    views: i64,
    conversions: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct WindowQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TopProductsQuery {
    pub metric: Option<String>,
    pub limit: Option<i64>,
    pub days: Option<i64>,
}

pub(super) async fn overview(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<OverviewBody>>, ApiError> {
    let days = query
        .days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);

    let summary = asindb_db::overview(&state.pool, days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: OverviewBody {
            total_products: summary.total_products,
            average_price: summary.average_price,
            average_rating: summary.average_rating,
            window_revenue: summary.window_revenue,
            window_days: days,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn top_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TopProductsQuery>,
) -> Result<Json<ApiResponse<Vec<TopProductItem>>>, ApiError> {
    // Out-of-enum metric names are a caller error, never a silent default.
    let metric: TopMetric = query
        .metric
        .as_deref()
        .unwrap_or("revenue")
        .parse()
        .map_err(|e: asindb_db::InvalidMetric| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_TOP_LIMIT)
        .clamp(1, MAX_TOP_LIMIT);
    let days = query
        .days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);

    let rows = asindb_db::top_products(&state.pool, metric, limit, days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TopProductItem {
            asin: row.asin,
            title: row.title,
            price: row.price,
            rating: row.rating,
            metric: metric.as_str(),
            metric_value: row.metric_value,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<Vec<TrendItem>>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if !(MIN_TREND_DAYS..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("days must be between {MIN_TREND_DAYS} and {MAX_WINDOW_DAYS}"),
        ));
    }

    let rows = asindb_db::trends(&state.pool, days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TrendItem {
            date: row.bucket,
            revenue: row.revenue,
            views: row.views,
            conversions: row.conversions,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
