//! Sync orchestration: the two caller-facing reconciliation operations,
//! composing the marketplace client (fetch) with the transactional write
//! path in the db crate (apply).
//!
//! `sync_product` is the authoritative refresh — it always hits upstream.
//! `get_with_fallback` is the read-with-lazy-populate — it only hits
//! upstream on a local miss. Callers choose consistency versus cost.

use sqlx::PgPool;
use thiserror::Error;

use asindb_db::{DbError, ProductRow};
use asindb_rainforest::{RainforestClient, Upstream};

#[derive(Debug, Error)]
pub enum SyncError {
    /// The ASIN is unknown to the local store and to upstream (or upstream
    /// was unavailable and could not vouch for it).
    #[error("product not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Fetches the canonical record from upstream and reconciles it into the
/// store. Nothing is written when upstream has no record.
///
/// # Errors
///
/// Returns [`SyncError::NotFound`] when upstream has no record for the ASIN
/// (or is unavailable), [`SyncError::Db`] when the transactional write fails.
pub async fn sync_product(
    pool: &PgPool,
    client: &RainforestClient,
    asin: &str,
) -> Result<ProductRow, SyncError> {
    let record = match client.product_details(asin).await {
        Upstream::Fetched(Some(record)) => record,
        Upstream::Fetched(None) | Upstream::Unavailable => return Err(SyncError::NotFound),
    };

    let row = asindb_db::apply_canonical(pool, &record).await?;
    tracing::info!(asin, "product synced from marketplace");
    Ok(row)
}

/// Returns the locally stored product, populating it from upstream only on a
/// local miss. The fast path makes no network call.
///
/// # Errors
///
/// Returns [`SyncError::NotFound`] when the ASIN is unknown on both sides,
/// [`SyncError::Db`] when a store operation fails.
pub async fn get_with_fallback(
    pool: &PgPool,
    client: &RainforestClient,
    asin: &str,
) -> Result<ProductRow, SyncError> {
    if let Some(row) = asindb_db::get_product(pool, asin).await? {
        return Ok(row);
    }

    sync_product(pool, client, asin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use asindb_core::{CanonicalProduct, Marketplace};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_client(base_url: &str) -> RainforestClient {
        RainforestClient::with_base_url(
            Some("test-key".to_string()),
            Marketplace::Us,
            30,
            base_url,
        )
        .expect("client construction should not fail")
    }

    fn detail_body(asin: &str, price: f64) -> serde_json::Value {
        serde_json::json!({
            "product": {
                "asin": asin,
                "title": "Synced Widget",
                "buybox_winner": { "price": { "value": price, "currency": "USD" } },
                "rating": 4.2,
                "ratings_total": 77,
                "brand": "WidgetWorks"
            }
        })
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_product_persists_the_upstream_record(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("type", "product"))
            .and(query_param("asin", "B0SYNC0001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("B0SYNC0001", 24.99)))
            .mount(&server)
            .await;

        let client = mock_client(&server.uri());
        let row = sync_product(&pool, &client, "B0SYNC0001")
            .await
            .expect("sync");

        assert_eq!(row.asin, "B0SYNC0001");
        assert_eq!(row.title, "Synced Widget");

        let history: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM price_history WHERE asin = 'B0SYNC0001'")
                .fetch_one(&pool)
                .await
                .expect("count");
        assert_eq!(history, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn sync_product_unknown_everywhere_writes_nothing(pool: PgPool) {
        let server = MockServer::start().await;
        // Upstream answers but carries no product object.
        Mock::given(method("GET"))
            .and(query_param("type", "product"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = mock_client(&server.uri());
        let result = sync_product(&pool, &client, "B0GHOST001").await;
        assert!(matches!(result, Err(SyncError::NotFound)));

        let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .expect("count products");
        let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM price_history")
            .fetch_one(&pool)
            .await
            .expect("count history");
        assert_eq!(products, 0);
        assert_eq!(history, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn fallback_populates_once_then_serves_locally(pool: PgPool) {
        let server = MockServer::start().await;
        // The mock tolerates exactly one hit: the second fallback call must
        // be served from the store without consulting upstream.
        Mock::given(method("GET"))
            .and(query_param("type", "product"))
            .and(query_param("asin", "B0FALL0001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("B0FALL0001", 12.5)))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server.uri());

        let first = get_with_fallback(&pool, &client, "B0FALL0001")
            .await
            .expect("first fallback");
        let second = get_with_fallback(&pool, &client, "B0FALL0001")
            .await
            .expect("second fallback");

        assert_eq!(first.id, second.id);
        assert_eq!(first.updated_at, second.updated_at);

        let local = asindb_db::get_product(&pool, "B0FALL0001")
            .await
            .expect("local lookup")
            .expect("populated row");
        assert_eq!(local.id, first.id);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn fallback_local_hit_ignores_a_broken_upstream(pool: PgPool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut record = CanonicalProduct::bare("B0LOCAL001", "Already Here");
        record.price = Some(9.99);
        asindb_db::insert_product(&pool, &record)
            .await
            .expect("seed product");

        let client = mock_client(&server.uri());
        let row = get_with_fallback(&pool, &client, "B0LOCAL001")
            .await
            .expect("fallback should hit the store first");
        assert_eq!(row.title, "Already Here");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn fallback_unavailable_upstream_and_local_miss_is_not_found(pool: PgPool) {
        let client = RainforestClient::new(None, Marketplace::Us, 30).expect("client");
        let result = get_with_fallback(&pool, &client, "B0NOWHERE1").await;
        assert!(matches!(result, Err(SyncError::NotFound)));
    }
}
