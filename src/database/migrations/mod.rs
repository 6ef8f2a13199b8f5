//! SeaORM migrations for the cache schema
//!
//! The table and its lookup indexes are created in separate migrations so
//! that adding an index to an already-deployed database is a pure schema
//! upgrade: existing records are never dropped or rewritten.

use sea_orm_migration::prelude::*;

pub mod m20260829_000001_create_stats_cache_records;
pub mod m20260829_000002_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_create_stats_cache_records::Migration),
            Box::new(m20260829_000002_add_lookup_indexes::Migration),
        ]
    }
}
