//! Domain models for the statistics cache
//!
//! These are the storage-independent types the engine and the worker
//! protocol operate on. The SeaORM entity models in `crate::entities` are
//! mapped to and from these by the repository layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Temporal dimension the statistics are aggregated by
///
/// Mirrors the date fields the repository platform indexes items under:
/// when the item was added to the repository, when it was originally
/// created, or when it was formally issued.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DateBasis {
    Added,
    Created,
    Issued,
}

impl Default for DateBasis {
    fn default() -> Self {
        DateBasis::Added
    }
}

/// Statistical view being requested
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    /// Usage and content statistics scoped to one community
    Community,
    /// Collection-level drill-down inside a community
    Collection,
    /// Whole-instance statistics
    Global,
}

/// Coordinates identifying one dashboard statistics request
///
/// All optional fields degrade to sentinels during key derivation rather
/// than failing; see [`crate::cache::key::KeyDeriver`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsQuery {
    /// Community identifier, absent for instance-wide dashboards
    pub community_id: Option<String>,
    pub dashboard_kind: DashboardKind,
    pub date_basis: DateBasis,
    /// Start of the reporting period; truncated to calendar-day precision
    pub start_date: Option<DateTime<Utc>>,
    /// End of the reporting period; truncated to calendar-day precision
    pub end_date: Option<DateTime<Utc>>,
}

impl StatsQuery {
    pub fn new(dashboard_kind: DashboardKind) -> Self {
        Self {
            community_id: None,
            dashboard_kind,
            date_basis: DateBasis::default(),
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_community(mut self, community_id: impl Into<String>) -> Self {
        self.community_id = Some(community_id.into());
        self
    }

    pub fn with_date_basis(mut self, date_basis: DateBasis) -> Self {
        self.date_basis = date_basis;
        self
    }

    pub fn with_period(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

/// One persisted cache record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Primary identity; see the key deriver for the format
    pub cache_key: String,
    /// Gzip-compressed JSON payload
    pub payload: Vec<u8>,
    /// When the payload was fetched from the statistics service
    pub stored_at: DateTime<Utc>,
    /// Updated on every successful read; drives LRU eviction
    pub last_accessed: DateTime<Utc>,
    pub community_id: Option<String>,
    /// Calendar year the data covers, derived once at write time
    pub period_year: Option<i32>,
    pub date_basis: DateBasis,
}

/// Fields required to create or replace a cache record
#[derive(Debug, Clone)]
pub struct NewCacheRecord {
    pub cache_key: String,
    pub payload: Vec<u8>,
    pub stored_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub community_id: Option<String>,
    pub period_year: Option<i32>,
    pub date_basis: DateBasis,
}

/// Point-in-time view of the cache for the `Stats` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    /// Records currently stored
    pub entry_count: u64,
    /// Configured capacity bound (`N_max`)
    pub capacity: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStatsSnapshot {
    /// Hit rate over all lookups, 0.0 when nothing was looked up yet
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
