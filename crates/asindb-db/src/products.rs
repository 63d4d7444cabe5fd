//! Database operations for `products` and `price_history`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use asindb_core::CanonicalProduct;

use crate::DbError;

pub(crate) const PRODUCT_COLUMNS: &str = "id, asin, title, price, currency, rating, review_count, \
     category, brand, availability, image_url, product_url, description, \
     features, dimensions, weight, created_at, updated_at";

/// A row from the `products` table.
///
/// `currency` is a `CHAR(3)` column and decodes as a plain `String`;
/// `features` and `dimensions` come back as raw JSONB values.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub asin: String,
    pub title: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub rating: Option<f64>,
    pub review_count: i32,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub availability: bool,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub description: Option<String>,
    pub features: Option<serde_json::Value>,
    pub dimensions: Option<serde_json::Value>,
    pub weight: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `price_history` table. Append-only; never mutated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub id: i64,
    pub asin: String,
    pub price: Decimal,
    pub currency: String,
    pub observed_at: DateTime<Utc>,
}

/// Input filters for product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductListFilters<'a> {
    pub category: Option<&'a str>,
    pub skip: i64,
    pub limit: i64,
}

/// Point lookup by ASIN.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, asin: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE asin = $1"
    ))
    .bind(asin)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Paginated product listing with an optional category filter, in stable
/// insertion (id) order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters<'_>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE ($1::TEXT IS NULL OR category = $1) \
         ORDER BY id \
         OFFSET $2 LIMIT $3"
    ))
    .bind(filters.category)
    .bind(filters.skip)
    .bind(filters.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a product from an explicit payload (the direct-creation path, not
/// reconciliation — a duplicate ASIN is a caller error here, not an update).
///
/// # Errors
///
/// Returns [`DbError::Conflict`] when the ASIN already exists, or
/// [`DbError::Sqlx`] for any other fault.
pub async fn insert_product(
    pool: &PgPool,
    record: &CanonicalProduct,
) -> Result<ProductRow, DbError> {
    let features = record.features.as_ref().map(|f| serde_json::json!(f));

    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
             (asin, title, price, currency, rating, review_count, category, brand, \
              availability, image_url, product_url, description, features, dimensions, weight) \
         VALUES ($1, $2, $3::numeric(10,2), COALESCE($4, 'USD'), $5, COALESCE($6, 0), $7, $8, \
                 COALESCE($9, TRUE), $10, $11, $12, $13, $14, $15) \
         RETURNING {PRODUCT_COLUMNS}"
    ))
    .bind(&record.asin)
    .bind(&record.title)
    .bind(record.price)
    .bind(record.currency.as_deref())
    .bind(record.rating)
    .bind(record.review_count)
    .bind(record.category.as_deref())
    .bind(record.brand.as_deref())
    .bind(record.availability)
    .bind(record.image_url.as_deref())
    .bind(record.product_url.as_deref())
    .bind(record.description.as_deref())
    .bind(features)
    .bind(record.dimensions.as_ref())
    .bind(record.weight)
    .fetch_one(pool)
    .await
    .map_err(unique_violation_as_conflict)?;

    Ok(row)
}

/// Returns price observations for an ASIN, most recent first.
///
/// Ordered by `observed_at DESC, id DESC` so that the first row is always
/// the latest even when observations share a timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_history(
    pool: &PgPool,
    asin: &str,
    limit: i64,
) -> Result<Vec<PriceHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceHistoryRow>(
        "SELECT id, asin, price, currency, observed_at \
         FROM price_history \
         WHERE asin = $1 \
         ORDER BY observed_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(asin)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

fn unique_violation_as_conflict(e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return DbError::Conflict;
        }
    }
    DbError::Sqlx(e)
}
