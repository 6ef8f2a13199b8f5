//! SeaORM entity models
//!
//! Generated-style entity definitions for the cache's single logical table.

pub mod prelude;
pub mod stats_cache_records;
