use sea_orm_migration::prelude::*;

use super::m20260829_000001_create_stats_cache_records::StatsCacheRecords;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Non-unique lookup indexes over the cache table
///
/// `stored_at` and `last_accessed` serve the expiry and eviction scans;
/// `community_id`, `period_year` and `date_basis` serve scoped
/// invalidation and categorical lookups. Every index is created with
/// `if_not_exists` so re-running against a database that already carries
/// one (or that predates this migration) leaves the records untouched.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, column) in [
            ("idx_stats_cache_stored_at", StatsCacheRecords::StoredAt),
            (
                "idx_stats_cache_last_accessed",
                StatsCacheRecords::LastAccessed,
            ),
            (
                "idx_stats_cache_community_id",
                StatsCacheRecords::CommunityId,
            ),
            ("idx_stats_cache_period_year", StatsCacheRecords::PeriodYear),
            ("idx_stats_cache_date_basis", StatsCacheRecords::DateBasis),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(StatsCacheRecords::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_stats_cache_stored_at",
            "idx_stats_cache_last_accessed",
            "idx_stats_cache_community_id",
            "idx_stats_cache_period_year",
            "idx_stats_cache_date_basis",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(StatsCacheRecords::Table)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
