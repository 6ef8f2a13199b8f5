pub use super::stats_cache_records::Entity as StatsCacheRecords;
