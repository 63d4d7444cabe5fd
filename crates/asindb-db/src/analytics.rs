//! Read-only aggregate queries over products and analytics events.
//!
//! Averages use SQL aggregate semantics: rows with NULL values are excluded
//! from the mean rather than counted as zero, and a NULL aggregate over an
//! empty set is coalesced to 0 at the query edge.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use crate::DbError;

/// The closed set of metrics a top-N query may rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopMetric {
    Revenue,
    Views,
    Conversions,
}

/// Rejection for out-of-enum metric names; the API layer maps this to a
/// validation error rather than guessing a default.
#[derive(Debug, Error)]
#[error("unknown metric '{0}' (expected revenue, views, or conversions)")]
pub struct InvalidMetric(String);

impl FromStr for TopMetric {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(TopMetric::Revenue),
            "views" => Ok(TopMetric::Views),
            "conversions" => Ok(TopMetric::Conversions),
            other => Err(InvalidMetric(other.to_string())),
        }
    }
}

impl TopMetric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TopMetric::Revenue => "revenue",
            TopMetric::Views => "views",
            TopMetric::Conversions => "conversions",
        }
    }
}

/// Key metrics over the whole catalog plus a trailing revenue window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyticsOverview {
    pub total_products: i64,
    pub average_price: Decimal,
    pub average_rating: Decimal,
    pub window_revenue: Decimal,
}

/// One product ranked by the summed metric.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopProductRow {
    pub asin: String,
    pub title: String,
    pub price: Option<Decimal>,
    pub rating: Option<f64>,
    pub metric_value: Decimal,
}

/// One calendar day's summed metrics. Days with no events produce no row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub bucket: NaiveDate,
    pub revenue: Decimal,
    pub views: i64,
    pub conversions: i64,
}

/// Catalog-wide rollup: product count, null-safe mean price and rating
/// (rounded to 2 places), and summed revenue over the trailing `days` window.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn overview(pool: &PgPool, days: i64) -> Result<AnalyticsOverview, DbError> {
    let row = sqlx::query_as::<_, AnalyticsOverview>(
        "SELECT \
             (SELECT COUNT(*) FROM products) AS total_products, \
             (SELECT COALESCE(ROUND(AVG(price), 2), 0) FROM products) AS average_price, \
             (SELECT COALESCE(ROUND(AVG(rating)::numeric, 2), 0) FROM products) AS average_rating, \
             (SELECT COALESCE(SUM(revenue), 0) FROM product_analytics \
              WHERE recorded_on >= NOW() - ($1 * INTERVAL '1 day')) AS window_revenue",
    )
    .bind(days)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Top products by one metric summed over the trailing window, descending.
///
/// Ties break in whatever order the storage layer yields groups — the
/// contract promises stability, not a secondary sort key.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_products(
    pool: &PgPool,
    metric: TopMetric,
    limit: i64,
    days: i64,
) -> Result<Vec<TopProductRow>, DbError> {
    // Column choice is driven by the closed enum, never caller text.
    let sql = match metric {
        TopMetric::Revenue => {
            "SELECT p.asin, p.title, p.price, p.rating, \
                    SUM(a.revenue)::numeric AS metric_value \
             FROM products p \
             JOIN product_analytics a ON a.asin = p.asin \
             WHERE a.recorded_on >= NOW() - ($1 * INTERVAL '1 day') \
             GROUP BY p.asin, p.title, p.price, p.rating \
             ORDER BY metric_value DESC \
             LIMIT $2"
        }
        TopMetric::Views => {
            "SELECT p.asin, p.title, p.price, p.rating, \
                    SUM(a.views)::numeric AS metric_value \
             FROM products p \
             JOIN product_analytics a ON a.asin = p.asin \
             WHERE a.recorded_on >= NOW() - ($1 * INTERVAL '1 day') \
             GROUP BY p.asin, p.title, p.price, p.rating \
             ORDER BY metric_value DESC \
             LIMIT $2"
        }
        TopMetric::Conversions => {
            "SELECT p.asin, p.title, p.price, p.rating, \
                    SUM(a.conversions)::numeric AS metric_value \
             FROM products p \
             JOIN product_analytics a ON a.asin = p.asin \
             WHERE a.recorded_on >= NOW() - ($1 * INTERVAL '1 day') \
             GROUP BY p.asin, p.title, p.price, p.rating \
             ORDER BY metric_value DESC \
             LIMIT $2"
        }
    };

    let rows = sqlx::query_as::<_, TopProductRow>(sql)
        .bind(days)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Day-bucketed metric sums over the trailing window, ascending by date.
///
/// Only days that actually have events appear; the caller gets an empty vec
/// for an empty window, never a zero-filled series.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn trends(pool: &PgPool, days: i64) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(
        "SELECT (a.recorded_on AT TIME ZONE 'UTC')::date AS bucket, \
                SUM(a.revenue) AS revenue, \
                SUM(a.views) AS views, \
                SUM(a.conversions) AS conversions \
         FROM product_analytics a \
         WHERE a.recorded_on >= NOW() - ($1 * INTERVAL '1 day') \
         GROUP BY bucket \
         ORDER BY bucket",
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_metric_parses_the_closed_set() {
        assert_eq!("revenue".parse::<TopMetric>().unwrap(), TopMetric::Revenue);
        assert_eq!("views".parse::<TopMetric>().unwrap(), TopMetric::Views);
        assert_eq!(
            "conversions".parse::<TopMetric>().unwrap(),
            TopMetric::Conversions
        );
    }

    #[test]
    fn top_metric_rejects_out_of_enum_values() {
        let err = "bounce_rate".parse::<TopMetric>().unwrap_err();
        assert!(err.to_string().contains("bounce_rate"));
        assert!("REVENUE".parse::<TopMetric>().is_err());
        assert!("".parse::<TopMetric>().is_err());
    }

    #[test]
    fn top_metric_round_trips_through_as_str() {
        for metric in [TopMetric::Revenue, TopMetric::Views, TopMetric::Conversions] {
            assert_eq!(metric.as_str().parse::<TopMetric>().unwrap(), metric);
        }
    }
}
