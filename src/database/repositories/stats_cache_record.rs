//! SeaORM-based cache record repository implementation
//!
//! This provides keyed access to the persisted cache records plus the
//! temporal and categorical lookups the expiry, eviction, and invalidation
//! paths rely on.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::str::FromStr;
use std::sync::Arc;

use crate::entities::{prelude::StatsCacheRecords, stats_cache_records};
use crate::errors::{CacheError, CacheResult};
use crate::models::{CacheRecord, DateBasis, NewCacheRecord};

/// SeaORM-based repository for cache record operations
pub struct StatsCacheRecordSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl StatsCacheRecordSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Create or replace the record for a cache key (upsert operation)
    ///
    /// Writes overwrite in place: there is exactly one record per key, and
    /// a repeated store for the same key replaces the payload and refreshes
    /// both timestamps.
    pub async fn upsert(&self, record: NewCacheRecord) -> CacheResult<CacheRecord> {
        let existing = StatsCacheRecords::find_by_id(&record.cache_key)
            .one(&*self.connection)
            .await?;

        let model = match existing {
            Some(existing_model) => {
                let mut active_model: stats_cache_records::ActiveModel = existing_model.into();
                active_model.payload = Set(record.payload);
                active_model.stored_at = Set(record.stored_at);
                active_model.last_accessed = Set(record.last_accessed);
                active_model.community_id = Set(record.community_id);
                active_model.period_year = Set(record.period_year);
                active_model.date_basis = Set(record.date_basis.to_string());

                active_model.update(&*self.connection).await?
            }
            None => {
                let active_model = stats_cache_records::ActiveModel {
                    cache_key: Set(record.cache_key),
                    payload: Set(record.payload),
                    stored_at: Set(record.stored_at),
                    last_accessed: Set(record.last_accessed),
                    community_id: Set(record.community_id),
                    period_year: Set(record.period_year),
                    date_basis: Set(record.date_basis.to_string()),
                };

                active_model.insert(&*self.connection).await?
            }
        };

        Self::model_to_domain(model)
    }

    /// Find a record by its cache key
    pub async fn find_by_key(&self, cache_key: &str) -> CacheResult<Option<CacheRecord>> {
        let model = StatsCacheRecords::find_by_id(cache_key)
            .one(&*self.connection)
            .await?;

        match model {
            Some(m) => Ok(Some(Self::model_to_domain(m)?)),
            None => Ok(None),
        }
    }

    /// Refresh the access timestamp for a key after a successful read
    pub async fn touch_last_accessed(
        &self,
        cache_key: &str,
        accessed_at: DateTime<Utc>,
    ) -> CacheResult<()> {
        let existing = StatsCacheRecords::find_by_id(cache_key)
            .one(&*self.connection)
            .await?;

        if let Some(model) = existing {
            let mut active_model: stats_cache_records::ActiveModel = model.into();
            active_model.last_accessed = Set(accessed_at);
            active_model.update(&*self.connection).await?;
        }

        Ok(())
    }

    /// Number of records currently stored
    pub async fn count(&self) -> CacheResult<u64> {
        Ok(StatsCacheRecords::find().count(&*self.connection).await?)
    }

    /// The least-recently-used record, optionally excluding one key
    ///
    /// Orders by access time (ties broken by store time) so the eviction
    /// policy is a strict LRU over reads, not writes. The exclusion keeps a
    /// just-written record safe from its own eviction pass.
    pub async fn least_recently_used(
        &self,
        exclude_key: Option<&str>,
    ) -> CacheResult<Option<CacheRecord>> {
        let mut query = StatsCacheRecords::find()
            .order_by_asc(stats_cache_records::Column::LastAccessed)
            .order_by_asc(stats_cache_records::Column::StoredAt);

        if let Some(key) = exclude_key {
            query = query.filter(stats_cache_records::Column::CacheKey.ne(key));
        }

        let model = query.one(&*self.connection).await?;
        match model {
            Some(m) => Ok(Some(Self::model_to_domain(m)?)),
            None => Ok(None),
        }
    }

    /// Delete a record by key; returns whether a record existed
    pub async fn delete_by_key(&self, cache_key: &str) -> CacheResult<bool> {
        let result = StatsCacheRecords::delete_by_id(cache_key)
            .exec(&*self.connection)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Delete every record stored for a community; returns the removed count
    pub async fn delete_by_community(&self, community_id: &str) -> CacheResult<u64> {
        let result = StatsCacheRecords::delete_many()
            .filter(stats_cache_records::Column::CommunityId.eq(community_id))
            .exec(&*self.connection)
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete all records; returns the removed count
    pub async fn delete_all(&self) -> CacheResult<u64> {
        let result = StatsCacheRecords::delete_many()
            .exec(&*self.connection)
            .await?;
        Ok(result.rows_affected)
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(model: stats_cache_records::Model) -> CacheResult<CacheRecord> {
        let date_basis = DateBasis::from_str(&model.date_basis).map_err(|_| {
            CacheError::InvalidRecord {
                message: format!(
                    "unknown date basis '{}' on record '{}'",
                    model.date_basis, model.cache_key
                ),
            }
        })?;

        Ok(CacheRecord {
            cache_key: model.cache_key,
            payload: model.payload,
            stored_at: model.stored_at,
            last_accessed: model.last_accessed,
            community_id: model.community_id,
            period_year: model.period_year,
            date_basis,
        })
    }
}
