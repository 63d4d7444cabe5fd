//! Database integration tests; each test gets a fresh migrated database via
//! `#[sqlx::test]`.

use asindb_core::CanonicalProduct;
use asindb_db::{
    apply_canonical, get_product, insert_product, list_price_history, list_products, overview,
    top_products, trends, DbError, ProductListFilters, TopMetric,
};
use sqlx::PgPool;

fn full_record(asin: &str) -> CanonicalProduct {
    CanonicalProduct {
        asin: asin.to_string(),
        title: "Insulated Water Bottle".to_string(),
        price: Some(24.99),
        currency: Some("USD".to_string()),
        rating: Some(4.6),
        review_count: Some(1834),
        category: Some("Kitchen".to_string()),
        brand: Some("HydraPeak".to_string()),
        availability: Some(true),
        image_url: Some("https://images.example.com/bottle.jpg".to_string()),
        product_url: Some("https://www.amazon.com/dp/B0TEST0001".to_string()),
        description: Some("32oz insulated bottle".to_string()),
        features: Some(vec!["Leakproof".to_string(), "BPA free".to_string()]),
        dimensions: Some(serde_json::json!({"Height": "10 in"})),
        weight: Some(1.1),
    }
}

async fn seed_analytics_event(pool: &PgPool, asin: &str, revenue: f64, views: i32, days_ago: i32) {
    sqlx::query(
        "INSERT INTO product_analytics (asin, views, conversions, revenue, recorded_on) \
         VALUES ($1, $2, $3, $4::numeric(12,2), NOW() - ($5 * INTERVAL '1 day'))",
    )
    .bind(asin)
    .bind(views)
    .bind(views / 10)
    .bind(revenue)
    .bind(days_ago)
    .execute(pool)
    .await
    .expect("seed analytics event");
}

async fn count_history_rows(pool: &PgPool, asin: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM price_history WHERE asin = $1")
        .bind(asin)
        .fetch_one(pool)
        .await
        .expect("count price_history")
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn apply_canonical_inserts_a_new_product(pool: PgPool) {
    let row = apply_canonical(&pool, &full_record("B0NEW00001"))
        .await
        .expect("apply");

    assert_eq!(row.asin, "B0NEW00001");
    assert_eq!(row.title, "Insulated Water Bottle");
    assert_eq!(row.price.map(|p| p.to_string()), Some("24.99".to_string()));
    assert_eq!(row.currency.trim(), "USD");
    assert_eq!(row.review_count, 1834);
    assert!(row.availability);
    assert_eq!(row.created_at, row.updated_at);

    // Positive price: exactly one observation on the insert branch.
    assert_eq!(count_history_rows(&pool, "B0NEW00001").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn apply_canonical_null_fields_leave_stored_values_untouched(pool: PgPool) {
    apply_canonical(&pool, &full_record("B0PART0001"))
        .await
        .expect("first apply");

    // Second observation: new price and title, but no category/brand/rating.
    let mut sparse = CanonicalProduct::bare("B0PART0001", "Insulated Water Bottle v2");
    sparse.price = Some(19.99);

    let row = apply_canonical(&pool, &sparse).await.expect("second apply");

    assert_eq!(row.title, "Insulated Water Bottle v2");
    assert_eq!(row.price.map(|p| p.to_string()), Some("19.99".to_string()));
    // Fields the sparse record did not carry survive from the first sync.
    assert_eq!(row.category.as_deref(), Some("Kitchen"));
    assert_eq!(row.brand.as_deref(), Some("HydraPeak"));
    assert_eq!(row.rating, Some(4.6));
    assert_eq!(row.review_count, 1834);
    assert!(row.features.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn syncing_twice_converges_one_product_and_two_observations(pool: PgPool) {
    let record = full_record("B0TWICE001");

    let first = apply_canonical(&pool, &record).await.expect("first apply");
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let second = apply_canonical(&pool, &record).await.expect("second apply");

    assert_eq!(first.id, second.id);
    assert_eq!(first.title, second.title);
    assert_eq!(first.price, second.price);
    assert_eq!(first.created_at, second.created_at);
    assert!(
        second.updated_at > first.updated_at,
        "updated_at must strictly increase across syncs"
    );

    let product_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE asin = 'B0TWICE001'")
            .fetch_one(&pool)
            .await
            .expect("count products");
    assert_eq!(product_count, 1);
    // Price history records observations over time, not deduplicated state.
    assert_eq!(count_history_rows(&pool, "B0TWICE001").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn absent_price_appends_no_observation(pool: PgPool) {
    let record = CanonicalProduct::bare("B0NOPRICE1", "Priceless Widget");
    apply_canonical(&pool, &record).await.expect("apply");
    assert_eq!(count_history_rows(&pool, "B0NOPRICE1").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn zero_price_appends_no_observation(pool: PgPool) {
    let mut record = CanonicalProduct::bare("B0ZERO0001", "Free Widget");
    record.price = Some(0.0);
    apply_canonical(&pool, &record).await.expect("apply");
    assert_eq!(count_history_rows(&pool, "B0ZERO0001").await, 0);
}

// ---------------------------------------------------------------------------
// Store read/write paths
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn get_product_returns_none_for_unknown_asin(pool: PgPool) {
    let found = get_product(&pool, "B0MISSING1").await.expect("lookup");
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_product_rejects_duplicate_asin(pool: PgPool) {
    insert_product(&pool, &full_record("B0DUP00001"))
        .await
        .expect("first insert");

    let result = insert_product(&pool, &full_record("B0DUP00001")).await;
    assert!(matches!(result, Err(DbError::Conflict)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_products_filters_by_category_and_paginates(pool: PgPool) {
    for i in 0..5 {
        let mut record = full_record(&format!("B0LIST000{i}"));
        record.category = Some(if i < 3 { "Kitchen" } else { "Garden" }.to_string());
        insert_product(&pool, &record).await.expect("insert");
    }

    let kitchen = list_products(
        &pool,
        ProductListFilters {
            category: Some("Kitchen"),
            skip: 0,
            limit: 100,
        },
    )
    .await
    .expect("list kitchen");
    assert_eq!(kitchen.len(), 3);

    let paged = list_products(
        &pool,
        ProductListFilters {
            category: None,
            skip: 2,
            limit: 2,
        },
    )
    .await
    .expect("list paged");
    assert_eq!(paged.len(), 2);
    assert_eq!(paged[0].asin, "B0LIST0002");
    assert_eq!(paged[1].asin, "B0LIST0003");
}

#[sqlx::test(migrations = "../../migrations")]
async fn price_history_lists_most_recent_first(pool: PgPool) {
    let mut record = full_record("B0HIST0001");
    for price in [10.0, 12.5, 11.0] {
        record.price = Some(price);
        apply_canonical(&pool, &record).await.expect("apply");
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let history = list_price_history(&pool, "B0HIST0001", 100)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].price.to_string(), "11.00");
    assert_eq!(history[2].price.to_string(), "10.00");
    assert!(history[0].observed_at >= history[1].observed_at);

    let capped = list_price_history(&pool, "B0HIST0001", 2)
        .await
        .expect("capped history");
    assert_eq!(capped.len(), 2);
}

// ---------------------------------------------------------------------------
// Analytics aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn overview_on_an_empty_database_is_all_zeroes(pool: PgPool) {
    let summary = overview(&pool, 30).await.expect("overview");
    assert_eq!(summary.total_products, 0);
    assert_eq!(summary.average_price.to_string(), "0");
    assert_eq!(summary.average_rating.to_string(), "0");
    assert_eq!(summary.window_revenue.to_string(), "0");
}

#[sqlx::test(migrations = "../../migrations")]
async fn overview_averages_exclude_null_rows(pool: PgPool) {
    let mut priced = CanonicalProduct::bare("B0AVG00001", "Priced, unrated");
    priced.price = Some(10.0);
    insert_product(&pool, &priced).await.expect("insert priced");

    let mut rated = CanonicalProduct::bare("B0AVG00002", "Rated, unpriced");
    rated.rating = Some(4.0);
    insert_product(&pool, &rated).await.expect("insert rated");

    let summary = overview(&pool, 30).await.expect("overview");
    assert_eq!(summary.total_products, 2);
    // NULL rows are excluded from the mean, not averaged in as zero.
    assert_eq!(summary.average_price.to_string(), "10.00");
    assert_eq!(summary.average_rating.to_string(), "4.00");
}

#[sqlx::test(migrations = "../../migrations")]
async fn overview_revenue_respects_the_window(pool: PgPool) {
    insert_product(&pool, &full_record("B0WIN00001"))
        .await
        .expect("insert");
    seed_analytics_event(&pool, "B0WIN00001", 100.0, 10, 2).await;
    seed_analytics_event(&pool, "B0WIN00001", 900.0, 10, 60).await;

    let summary = overview(&pool, 30).await.expect("overview");
    assert_eq!(summary.window_revenue.to_string(), "100.00");
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_products_ranks_by_summed_metric_descending(pool: PgPool) {
    for (asin, revenue) in [("B0TOPA0001", 100.0), ("B0TOPB0001", 50.0), ("B0TOPC0001", 200.0)] {
        insert_product(&pool, &full_record(asin)).await.expect("insert");
        seed_analytics_event(&pool, asin, revenue, 10, 1).await;
    }

    let top = top_products(&pool, TopMetric::Revenue, 2, 30)
        .await
        .expect("top products");

    let asins: Vec<&str> = top.iter().map(|r| r.asin.as_str()).collect();
    assert_eq!(asins, vec!["B0TOPC0001", "B0TOPA0001"]);
    assert_eq!(top[0].metric_value.to_string(), "200.00");
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_products_sums_views_across_events(pool: PgPool) {
    insert_product(&pool, &full_record("B0VIEWS001"))
        .await
        .expect("insert");
    seed_analytics_event(&pool, "B0VIEWS001", 0.0, 30, 1).await;
    seed_analytics_event(&pool, "B0VIEWS001", 0.0, 70, 2).await;

    let top = top_products(&pool, TopMetric::Views, 10, 30)
        .await
        .expect("top products");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].metric_value.to_string(), "100");
}

#[sqlx::test(migrations = "../../migrations")]
async fn trends_on_an_empty_window_is_an_empty_sequence(pool: PgPool) {
    insert_product(&pool, &full_record("B0TREND001"))
        .await
        .expect("insert");
    // One event well outside the window.
    seed_analytics_event(&pool, "B0TREND001", 40.0, 4, 100).await;

    let rows = trends(&pool, 7).await.expect("trends");
    assert!(rows.is_empty(), "days without events are omitted, not zero-filled");
}

#[sqlx::test(migrations = "../../migrations")]
async fn trends_buckets_by_day_in_ascending_order(pool: PgPool) {
    insert_product(&pool, &full_record("B0TREND002"))
        .await
        .expect("insert");
    seed_analytics_event(&pool, "B0TREND002", 10.0, 5, 3).await;
    seed_analytics_event(&pool, "B0TREND002", 20.0, 5, 3).await;
    seed_analytics_event(&pool, "B0TREND002", 40.0, 5, 1).await;

    let rows = trends(&pool, 7).await.expect("trends");
    assert_eq!(rows.len(), 2);
    assert!(rows[0].bucket < rows[1].bucket);
    assert_eq!(rows[0].revenue.to_string(), "30.00");
    assert_eq!(rows[1].revenue.to_string(), "40.00");
    assert_eq!(rows[0].views, 10);
}
