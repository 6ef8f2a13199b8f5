//! Cache engine orchestration
//!
//! Ties the key deriver, codec, expiry policy, and record store together
//! into the five operations the worker protocol exposes: get, set,
//! invalidate, clear, and stats. The engine runs inside a single worker
//! context, so no internal locking is needed; the atomics below only
//! exist so the stats counters survive `&self` access.

use chrono::{Datelike, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::codec;
use super::expiry::ExpiryPolicy;
use super::key::KeyDeriver;
use crate::config::CachePolicy;
use crate::database::repositories::StatsCacheRecordSeaOrmRepository;
use crate::errors::CacheResult;
use crate::models::{CacheStatsSnapshot, NewCacheRecord, StatsQuery};

/// Result of a cache lookup
///
/// A miss is a normal outcome, never an error; the rendering layer falls
/// back to the remote statistics service on miss.
#[derive(Debug, Clone)]
pub enum Lookup {
    Hit {
        document: Value,
        /// When the payload was originally fetched, so callers can display
        /// data freshness
        stored_at: chrono::DateTime<Utc>,
        period_year: Option<i32>,
    },
    Miss,
}

/// Result of a successful store
#[derive(Debug, Clone)]
pub struct StoreOutcome {
    pub cache_key: String,
    pub compression_ratio: f64,
}

#[derive(Default)]
struct EngineCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// The cache engine
pub struct StatsCacheEngine {
    repository: StatsCacheRecordSeaOrmRepository,
    deriver: KeyDeriver,
    expiry: ExpiryPolicy,
    capacity: u64,
    counters: EngineCounters,
}

impl StatsCacheEngine {
    pub fn new(repository: StatsCacheRecordSeaOrmRepository, policy: &CachePolicy) -> Self {
        Self {
            repository,
            deriver: KeyDeriver::new(policy.scope_prefix.clone()),
            expiry: ExpiryPolicy::new(policy),
            capacity: policy.capacity,
            counters: EngineCounters::default(),
        }
    }

    /// Look up the cached document for a request
    ///
    /// Expired records are reported as misses but left in place so a
    /// concurrent write can still supersede them. An undecodable payload
    /// is downgraded to a miss with an internal diagnostic.
    pub async fn get(&self, query: &StatsQuery) -> CacheResult<Lookup> {
        let cache_key = self.deriver.derive(query);

        let Some(record) = self.repository.find_by_key(&cache_key).await? else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Miss);
        };

        let now = Utc::now();
        if !self.expiry.is_valid(&record, now) {
            debug!(
                "Cache record {} expired (stored {}), reporting miss",
                cache_key, record.stored_at
            );
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Lookup::Miss);
        }

        let document = match codec::decompress(&record.payload) {
            Ok(document) => document,
            Err(e) if codec::is_recoverable_decode_failure(&e) => {
                warn!("Cache record {} has an undecodable payload: {}", cache_key, e);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(Lookup::Miss);
            }
            Err(e) => return Err(e),
        };

        self.repository.touch_last_accessed(&cache_key, now).await?;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);

        Ok(Lookup::Hit {
            document,
            stored_at: record.stored_at,
            period_year: record.period_year,
        })
    }

    /// Compress and store a document, then enforce the capacity bound
    ///
    /// A repeated store for the same key overwrites in place. Failures
    /// here fail this single request only; the caller may re-issue.
    pub async fn set(
        &self,
        query: &StatsQuery,
        document: &Value,
        explicit_year: Option<i32>,
    ) -> CacheResult<StoreOutcome> {
        let cache_key = self.deriver.derive(query);
        let period_year = derive_period_year(explicit_year, query);
        let compressed = codec::compress(document)?;
        let compression_ratio = compressed.compression_ratio;
        let now = Utc::now();

        self.repository
            .upsert(NewCacheRecord {
                cache_key: cache_key.clone(),
                payload: compressed.bytes,
                stored_at: now,
                last_accessed: now,
                community_id: query.community_id.clone(),
                period_year,
                date_basis: query.date_basis,
            })
            .await?;

        debug!(
            "Stored cache record {} (ratio {:.2}, period year {:?})",
            cache_key, compression_ratio, period_year
        );

        self.enforce_capacity(&cache_key).await?;

        Ok(StoreOutcome {
            cache_key,
            compression_ratio,
        })
    }

    /// Remove records for one community, or every record when none is given
    pub async fn invalidate(&self, community_id: Option<&str>) -> CacheResult<u64> {
        let removed = match community_id {
            Some(community) => self.repository.delete_by_community(community).await?,
            None => self.repository.delete_all().await?,
        };

        debug!(
            "Invalidated {} cache record(s) (community: {:?})",
            removed, community_id
        );
        Ok(removed)
    }

    /// Remove every record
    pub async fn clear(&self) -> CacheResult<u64> {
        self.repository.delete_all().await
    }

    /// Current entry count, capacity, and lookup counters
    pub async fn stats(&self) -> CacheResult<CacheStatsSnapshot> {
        Ok(CacheStatsSnapshot {
            entry_count: self.repository.count().await?,
            capacity: self.capacity,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        })
    }

    /// Evict least-recently-used records until the store fits its capacity
    ///
    /// Runs synchronously as part of every write and never evicts the
    /// record just written. Capacity pressure is resolved here, never
    /// surfaced to the caller.
    async fn enforce_capacity(&self, just_written: &str) -> CacheResult<()> {
        loop {
            let count = self.repository.count().await?;
            if count <= self.capacity {
                return Ok(());
            }

            let Some(victim) = self
                .repository
                .least_recently_used(Some(just_written))
                .await?
            else {
                return Ok(());
            };

            self.repository.delete_by_key(&victim.cache_key).await?;
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Evicted cache record {} (last accessed {})",
                victim.cache_key, victim.last_accessed
            );
        }
    }
}

/// Period year for a write: an explicit value wins, otherwise the start
/// date's calendar year, otherwise unknown
fn derive_period_year(explicit_year: Option<i32>, query: &StatsQuery) -> Option<i32> {
    explicit_year.or_else(|| query.start_date.map(|d| d.year()))
}
