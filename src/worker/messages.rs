//! Typed request/response messages for the cache worker
//!
//! One tagged variant per request kind, dispatched through a single
//! handler, so exhaustiveness is compiler-checked. Errors travel inside
//! the response envelope as a `Failed` reply; nothing is ever thrown
//! across the channel.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::models::{CacheStatsSnapshot, StatsQuery};

/// A request plus its correlation id and reply channel
#[derive(Debug)]
pub struct RequestEnvelope {
    pub request_id: Uuid,
    pub request: CacheRequest,
    pub reply: oneshot::Sender<ResponseEnvelope>,
}

/// The request kinds the worker accepts
#[derive(Debug, Clone)]
pub enum CacheRequest {
    /// Look up cached statistics for a request
    Get { query: StatsQuery },
    /// Compress and store freshly fetched statistics
    Set {
        query: StatsQuery,
        document: Value,
        period_year: Option<i32>,
    },
    /// Remove records for one community, or everything when none is given
    Invalidate { community_id: Option<String> },
    /// Remove every record
    Clear,
    /// Introspection: entry count, capacity, and counters
    Stats,
}

impl CacheRequest {
    /// Request-kind discriminant for logging
    pub fn kind(&self) -> &'static str {
        match self {
            CacheRequest::Get { .. } => "get",
            CacheRequest::Set { .. } => "set",
            CacheRequest::Invalidate { .. } => "invalidate",
            CacheRequest::Clear => "clear",
            CacheRequest::Stats => "stats",
        }
    }
}

/// A reply tagged with the correlation id of the request it answers
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub request_id: Uuid,
    pub reply: CacheReply,
}

/// The single response emitted per request
///
/// `Miss` is a successful reply, not a failure; the rendering layer falls
/// back to the remote statistics service on miss or on `Failed`.
#[derive(Debug, Clone)]
pub enum CacheReply {
    Hit {
        document: Value,
        stored_at: DateTime<Utc>,
        period_year: Option<i32>,
    },
    Miss,
    Stored {
        cache_key: String,
        compression_ratio: f64,
    },
    Invalidated {
        removed: u64,
    },
    Cleared {
        removed: u64,
    },
    Stats(CacheStatsSnapshot),
    Failed {
        reason: String,
    },
}

impl CacheReply {
    pub fn is_success(&self) -> bool {
        !matches!(self, CacheReply::Failed { .. })
    }
}
