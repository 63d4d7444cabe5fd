//! The reconciliation write path: converge local state with a canonical
//! upstream record, exactly once per call.
//!
//! This module is the sole writer of `products` and `price_history`. The
//! product upsert and the price-history append share one transaction, so a
//! fault at any point rolls the whole call back and concurrent syncs of the
//! same ASIN serialize on the product row at the storage layer.

use sqlx::PgPool;

use asindb_core::CanonicalProduct;

use crate::products::{ProductRow, PRODUCT_COLUMNS};
use crate::DbError;

/// Applies a canonical record to the store: insert-or-partial-update of the
/// product plus, when the record carries a strictly positive price, exactly
/// one price-history observation.
///
/// Partial-update semantics are carried by the SQL itself: on conflict every
/// nullable column updates via `COALESCE($n, products.col)`, so a field the
/// upstream payload did not supply can never clobber stored state.
/// `updated_at` moves on every call; `created_at` is set once on the insert
/// branch and never touched again.
///
/// The scrape-time `f64` price is bound as a float and cast to
/// `NUMERIC(10,2)` by the database engine — the documented precision
/// boundary between parsing and persistence.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction rolls
/// back and no partial write survives.
pub async fn apply_canonical(
    pool: &PgPool,
    record: &CanonicalProduct,
) -> Result<ProductRow, DbError> {
    let mut tx = pool.begin().await?;

    let features = record.features.as_ref().map(|f| serde_json::json!(f));

    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products \
             (asin, title, price, currency, rating, review_count, category, brand, \
              availability, image_url, product_url, description, features, dimensions, weight) \
         VALUES ($1, $2, $3::numeric(10,2), COALESCE($4, 'USD'), $5, COALESCE($6, 0), $7, $8, \
                 COALESCE($9, TRUE), $10, $11, $12, $13, $14, $15) \
         ON CONFLICT (asin) DO UPDATE SET \
             title        = EXCLUDED.title, \
             price        = COALESCE($3::numeric(10,2), products.price), \
             currency     = COALESCE($4, products.currency), \
             rating       = COALESCE($5, products.rating), \
             review_count = COALESCE($6, products.review_count), \
             category     = COALESCE($7, products.category), \
             brand        = COALESCE($8, products.brand), \
             availability = COALESCE($9, products.availability), \
             image_url    = COALESCE($10, products.image_url), \
             product_url  = COALESCE($11, products.product_url), \
             description  = COALESCE($12, products.description), \
             features     = COALESCE($13, products.features), \
             dimensions   = COALESCE($14, products.dimensions), \
             weight       = COALESCE($15, products.weight), \
             updated_at   = NOW() \
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
    .fetch_one(&mut *tx)
    .await?;

    // Every sync with a strictly positive price is one time-series
    // observation, on both the insert and the update branch. Zero and absent
    // prices are not observations.
    if let Some(price) = record.price {
        if price > 0.0 {
            sqlx::query(
                "INSERT INTO price_history (asin, price, currency, observed_at) \
                 VALUES ($1, $2::numeric(10,2), COALESCE($3, 'USD'), NOW())",
            )
            .bind(&record.asin)
            .bind(price)
            .bind(record.currency.as_deref())
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(row)
}
