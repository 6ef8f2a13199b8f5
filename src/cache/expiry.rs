//! Record expiry policy
//!
//! A state-free validity decision over a record's age. Records covering the
//! still-accumulating current calendar year go stale after one hour;
//! records covering closed past years (or an unknown period) are treated as
//! immutable for all practical purposes and live for a year. Expired
//! records are never deleted here; they are simply not servable, and a
//! later write for the same key supersedes them in place.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::config::CachePolicy;
use crate::models::CacheRecord;

/// Validity decision function for stored records
#[derive(Debug, Clone)]
pub struct ExpiryPolicy {
    current_period_ttl: Duration,
    closed_period_ttl: Duration,
}

impl ExpiryPolicy {
    pub fn new(policy: &CachePolicy) -> Self {
        // Durations beyond chrono's range make no sense as TTLs; clamp to max
        Self {
            current_period_ttl: Duration::from_std(policy.current_period_ttl)
                .unwrap_or(Duration::MAX),
            closed_period_ttl: Duration::from_std(policy.closed_period_ttl)
                .unwrap_or(Duration::MAX),
        }
    }

    /// Whether a stored record is still servable at `now`
    pub fn is_valid(&self, record: &CacheRecord, now: DateTime<Utc>) -> bool {
        let age = now - record.stored_at;
        if age < Duration::zero() {
            // Clock skew; a record from the future is as fresh as it gets
            return true;
        }

        let is_current_period = record.period_year == Some(now.year());
        let max_age = if is_current_period {
            self.current_period_ttl
        } else {
            self.closed_period_ttl
        };

        age < max_age
    }
}
