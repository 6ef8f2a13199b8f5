//! Cache key derivation
//!
//! A cache key is a stable string identity for one statistics request:
//!
//! `{scope-prefix}_{community-short}_{dashboard-kind}_{date-basis}_{start}_{end}`
//!
//! Derivation is total: missing coordinates degrade to sentinels instead of
//! failing. Dates are truncated to calendar-day precision, an explicit and
//! accepted precision loss; two requests that differ only below day
//! granularity share a key.

use chrono::{DateTime, Utc};

use crate::models::StatsQuery;

/// Sentinel for requests without a community scope
const GLOBAL_COMMUNITY: &str = "global";
/// Sentinel for an unbounded period edge
const DEFAULT_DATE: &str = "default";
/// Length of the community-id prefix that goes into the key
const COMMUNITY_SHORT_LEN: usize = 8;

/// Derives cache keys for statistics requests
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    scope_prefix: String,
}

impl KeyDeriver {
    pub fn new(scope_prefix: impl Into<String>) -> Self {
        Self {
            scope_prefix: scope_prefix.into(),
        }
    }

    /// Derive the cache key for a request
    ///
    /// Pure and deterministic: identical inputs always produce an identical
    /// key, and distinct truncated coordinate tuples never collide.
    pub fn derive(&self, query: &StatsQuery) -> String {
        let community_short = match &query.community_id {
            Some(id) => id.chars().take(COMMUNITY_SHORT_LEN).collect::<String>(),
            None => GLOBAL_COMMUNITY.to_string(),
        };

        format!(
            "{}_{}_{}_{}_{}_{}",
            self.scope_prefix,
            community_short,
            query.dashboard_kind,
            query.date_basis,
            Self::day_component(query.start_date),
            Self::day_component(query.end_date),
        )
    }

    fn day_component(date: Option<DateTime<Utc>>) -> String {
        match date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => DEFAULT_DATE.to_string(),
        }
    }
}
