//! SeaORM repository implementations
//!
//! The record store behind the cache engine. Index maintenance is never a
//! separate step here: the lookup indexes live on the table itself, so
//! every upsert and delete keeps them consistent by construction.

pub mod stats_cache_record;

// Re-export for convenience
pub use stats_cache_record::StatsCacheRecordSeaOrmRepository;
