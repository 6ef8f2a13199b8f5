//! Cache engine integration testing
//!
//! Exercises the engine against a real (in-memory SQLite) record store:
//! store/lookup round trips, the asymmetric TTL, LRU eviction, scoped
//! invalidation, and the miss semantics for absent, expired, and corrupt
//! records.

use chrono::{Datelike, Duration, TimeZone, Utc};
use serde_json::json;

use isd_stats_cache::{
    cache::{Lookup, StatsCacheEngine, codec},
    config::{CacheConfig, CachePolicy, DatabaseConfig},
    database::{Database, repositories::StatsCacheRecordSeaOrmRepository},
    models::{DashboardKind, DateBasis, NewCacheRecord, StatsQuery},
};

/// Helper to create an isolated in-memory database with the schema applied
async fn create_test_database() -> Database {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        // A single pooled connection, otherwise every connection would get
        // its own private in-memory database
        max_connections: Some(1),
    };
    let database = Database::new(&config).await.expect("Failed to connect");
    database.migrate().await.expect("Failed to run migrations");
    database
}

fn test_policy(capacity: u64) -> CachePolicy {
    CacheConfig {
        capacity,
        ..CacheConfig::default()
    }
    .resolve()
    .unwrap()
}

async fn create_test_engine(capacity: u64) -> (StatsCacheEngine, StatsCacheRecordSeaOrmRepository) {
    let database = create_test_database().await;
    let engine = StatsCacheEngine::new(
        StatsCacheRecordSeaOrmRepository::new(database.connection()),
        &test_policy(capacity),
    );
    let repository = StatsCacheRecordSeaOrmRepository::new(database.connection());
    (engine, repository)
}

fn community_query() -> StatsQuery {
    StatsQuery::new(DashboardKind::Community)
        .with_community("abc12345-6789-4abc-9def-0123456789ab")
        .with_date_basis(DateBasis::Added)
        .with_period(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        )
}

/// Insert a record directly with controlled timestamps
async fn insert_backdated(
    repository: &StatsCacheRecordSeaOrmRepository,
    cache_key: &str,
    community_id: Option<&str>,
    period_year: Option<i32>,
    age: Duration,
) {
    let when = Utc::now() - age;
    repository
        .upsert(NewCacheRecord {
            cache_key: cache_key.to_string(),
            payload: codec::compress(&json!({"key": cache_key})).unwrap().bytes,
            stored_at: when,
            last_accessed: when,
            community_id: community_id.map(str::to_string),
            period_year,
            date_basis: DateBasis::Added,
        })
        .await
        .expect("Failed to insert record");
}

// =============================================================================
// STORE / LOOKUP ROUND TRIP
// =============================================================================

#[tokio::test]
async fn test_store_then_lookup_round_trip() {
    let (engine, _repo) = create_test_engine(20).await;
    let query = community_query();
    let document = json!({"x": 1});

    let stored = engine.set(&query, &document, None).await.unwrap();
    assert_eq!(
        stored.cache_key,
        "isd_abc12345_community_added_2024-01-01_2024-01-31"
    );
    assert!(stored.compression_ratio > 0.0);

    // Read-after-write: a fresh store is always a hit, regardless of TTL
    match engine.get(&query).await.unwrap() {
        Lookup::Hit {
            document: found,
            stored_at,
            period_year,
        } => {
            assert_eq!(found, document);
            assert_eq!(period_year, Some(2024));
            assert!(Utc::now() - stored_at < Duration::minutes(1));
        }
        Lookup::Miss => panic!("Expected a hit after a fresh store"),
    }

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.entry_count, 1);
    assert_eq!(stats.capacity, 20);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 0);
}

#[tokio::test]
async fn test_repeated_store_overwrites_in_place() {
    let (engine, _repo) = create_test_engine(20).await;
    let query = community_query();

    engine.set(&query, &json!({"version": 1}), None).await.unwrap();
    engine.set(&query, &json!({"version": 2}), None).await.unwrap();

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.entry_count, 1);

    match engine.get(&query).await.unwrap() {
        Lookup::Hit { document, .. } => assert_eq!(document, json!({"version": 2})),
        Lookup::Miss => panic!("Expected a hit"),
    }
}

#[tokio::test]
async fn test_explicit_period_year_wins() {
    let (engine, _repo) = create_test_engine(20).await;
    let query = community_query();

    engine.set(&query, &json!({"x": 1}), Some(2022)).await.unwrap();

    match engine.get(&query).await.unwrap() {
        Lookup::Hit { period_year, .. } => assert_eq!(period_year, Some(2022)),
        Lookup::Miss => panic!("Expected a hit"),
    }
}

// =============================================================================
// MISS SEMANTICS
// =============================================================================

#[tokio::test]
async fn test_lookup_on_absent_key_is_a_miss() {
    let (engine, _repo) = create_test_engine(20).await;

    let lookup = engine.get(&community_query()).await.unwrap();
    assert!(matches!(lookup, Lookup::Miss));

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_expired_record_reports_miss_but_stays_stored() {
    let (engine, repository) = create_test_engine(20).await;
    let current_year = Utc::now().year();

    // Current-year data older than an hour is stale
    insert_backdated(
        &repository,
        "isd_abc12345_community_added_default_default",
        Some("abc12345-6789-4abc-9def-0123456789ab"),
        Some(current_year),
        Duration::hours(2),
    )
    .await;

    let query = StatsQuery::new(DashboardKind::Community)
        .with_community("abc12345-6789-4abc-9def-0123456789ab");
    let lookup = engine.get(&query).await.unwrap();
    assert!(matches!(lookup, Lookup::Miss));

    // Left in place so a later write supersedes it rather than racing a delete
    assert_eq!(repository.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_closed_year_record_survives_for_months() {
    let (engine, repository) = create_test_engine(20).await;
    let last_year = Utc::now().year() - 1;

    insert_backdated(
        &repository,
        "isd_abc12345_community_added_default_default",
        Some("abc12345-6789-4abc-9def-0123456789ab"),
        Some(last_year),
        Duration::days(30),
    )
    .await;

    let query = StatsQuery::new(DashboardKind::Community)
        .with_community("abc12345-6789-4abc-9def-0123456789ab");
    assert!(matches!(
        engine.get(&query).await.unwrap(),
        Lookup::Hit { .. }
    ));
}

#[tokio::test]
async fn test_corrupt_payload_is_a_miss_not_an_error() {
    let (engine, repository) = create_test_engine(20).await;
    let now = Utc::now();

    repository
        .upsert(NewCacheRecord {
            cache_key: "isd_global_global_added_default_default".to_string(),
            payload: b"definitely not gzip".to_vec(),
            stored_at: now,
            last_accessed: now,
            community_id: None,
            period_year: None,
            date_basis: DateBasis::Added,
        })
        .await
        .unwrap();

    let lookup = engine.get(&StatsQuery::new(DashboardKind::Global)).await.unwrap();
    assert!(matches!(lookup, Lookup::Miss));
}

// =============================================================================
// EVICTION
// =============================================================================

#[tokio::test]
async fn test_eviction_removes_least_recently_accessed() {
    let (engine, repository) = create_test_engine(20).await;
    let last_year = Utc::now().year() - 1;

    // Fill to capacity with strictly increasing access times; key_000 is
    // the least recently used
    for i in 0..20 {
        insert_backdated(
            &repository,
            &format!("isd_global_global_added_2025-01-{:02}_default", i + 1),
            None,
            Some(last_year),
            Duration::minutes(100 - i),
        )
        .await;
    }
    assert_eq!(repository.count().await.unwrap(), 20);

    // The 21st write triggers exactly one eviction
    let query = StatsQuery::new(DashboardKind::Global).with_period(
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap(),
    );
    let stored = engine.set(&query, &json!({"fresh": true}), None).await.unwrap();

    assert_eq!(repository.count().await.unwrap(), 20);
    assert!(
        repository
            .find_by_key("isd_global_global_added_2025-01-01_default")
            .await
            .unwrap()
            .is_none(),
        "the record with the smallest last_accessed must be evicted"
    );
    assert!(
        repository
            .find_by_key(&stored.cache_key)
            .await
            .unwrap()
            .is_some(),
        "the record just written must never be evicted"
    );

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.evictions, 1);
}

#[tokio::test]
async fn test_eviction_tie_breaks_on_stored_at() {
    let (engine, repository) = create_test_engine(2).await;
    let accessed = Utc::now() - Duration::minutes(30);
    let last_year = Utc::now().year() - 1;

    for (key, stored_offset) in [("isd_a_community_added_default_default", 10), (
        "isd_b_community_added_default_default",
        5,
    )] {
        repository
            .upsert(NewCacheRecord {
                cache_key: key.to_string(),
                payload: codec::compress(&json!({})).unwrap().bytes,
                stored_at: accessed - Duration::minutes(stored_offset),
                last_accessed: accessed,
                community_id: None,
                period_year: Some(last_year),
                date_basis: DateBasis::Added,
            })
            .await
            .unwrap();
    }

    engine
        .set(&StatsQuery::new(DashboardKind::Global), &json!({}), None)
        .await
        .unwrap();

    assert_eq!(repository.count().await.unwrap(), 2);
    // Equal access times: the earlier stored_at loses
    assert!(
        repository
            .find_by_key("isd_a_community_added_default_default")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repository
            .find_by_key("isd_b_community_added_default_default")
            .await
            .unwrap()
            .is_some()
    );
}

// =============================================================================
// INVALIDATION
// =============================================================================

#[tokio::test]
async fn test_invalidate_is_scoped_to_the_community() {
    let (engine, repository) = create_test_engine(20).await;
    let last_year = Utc::now().year() - 1;

    insert_backdated(&repository, "isd_aaaa_community_added_default_default", Some("aaaa"), Some(last_year), Duration::minutes(3)).await;
    insert_backdated(&repository, "isd_aaaa_collection_added_default_default", Some("aaaa"), Some(last_year), Duration::minutes(2)).await;
    insert_backdated(&repository, "isd_bbbb_community_added_default_default", Some("bbbb"), Some(last_year), Duration::minutes(1)).await;
    insert_backdated(&repository, "isd_global_global_added_default_default", None, Some(last_year), Duration::minutes(1)).await;

    let removed = engine.invalidate(Some("aaaa")).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repository.count().await.unwrap(), 2);

    // Global records are untouched by community-scoped invalidation
    assert!(
        repository
            .find_by_key("isd_global_global_added_default_default")
            .await
            .unwrap()
            .is_some()
    );

    // No community means everything goes
    let removed = engine.invalidate(None).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_backed_store_is_auto_created() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("stats-cache.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: Some(1),
    };

    let database = Database::new(&config).await.unwrap();
    database.migrate().await.unwrap();
    assert!(db_path.exists());

    // Reconnecting against the existing file re-runs migrations as a no-op
    let database = Database::new(&config).await.unwrap();
    database.migrate().await.unwrap();
}

#[tokio::test]
async fn test_clear_empties_the_store() {
    let (engine, repository) = create_test_engine(20).await;

    engine
        .set(&community_query(), &json!({"x": 1}), None)
        .await
        .unwrap();
    engine
        .set(&StatsQuery::new(DashboardKind::Global), &json!({"y": 2}), None)
        .await
        .unwrap();

    let removed = engine.clear().await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(repository.count().await.unwrap(), 0);
}
