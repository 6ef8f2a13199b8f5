use sea_orm::entity::prelude::*;

/// Persisted cache record: one row per cache key
///
/// `payload` is the gzip-compressed JSON document. Timestamps are stored
/// as UTC; `community_id` and `period_year` are nullable because
/// instance-wide dashboards have neither.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stats_cache_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cache_key: String,
    #[sea_orm(column_type = "Blob")]
    pub payload: Vec<u8>,
    pub stored_at: DateTimeUtc,
    pub last_accessed: DateTimeUtc,
    pub community_id: Option<String>,
    pub period_year: Option<i32>,
    pub date_basis: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
