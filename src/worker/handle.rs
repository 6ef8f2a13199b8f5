//! Caller-side handle for the cache worker
//!
//! Cloneable and cheap; every call generates a fresh correlation id,
//! submits an envelope, and resolves when the worker's single response
//! for that id arrives. Calls never block the caller's thread.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::messages::{CacheReply, CacheRequest, RequestEnvelope, ResponseEnvelope};
use crate::errors::{CacheError, CacheResult};
use crate::models::StatsQuery;

/// Handle used by the rendering side to talk to the worker
#[derive(Clone)]
pub struct CacheHandle {
    tx: mpsc::Sender<RequestEnvelope>,
}

impl CacheHandle {
    pub fn new(tx: mpsc::Sender<RequestEnvelope>) -> Self {
        Self { tx }
    }

    /// Submit a raw request and await its correlated response envelope
    pub async fn request(&self, request: CacheRequest) -> CacheResult<ResponseEnvelope> {
        let request_id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(RequestEnvelope {
                request_id,
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CacheError::Dispatch {
                message: "cache worker is no longer running".to_string(),
            })?;

        let envelope = reply_rx.await.map_err(|_| CacheError::Dispatch {
            message: "cache worker dropped the request".to_string(),
        })?;

        debug_assert_eq!(envelope.request_id, request_id);
        Ok(envelope)
    }

    /// Look up cached statistics
    pub async fn get(&self, query: StatsQuery) -> CacheResult<CacheReply> {
        Ok(self.request(CacheRequest::Get { query }).await?.reply)
    }

    /// Store freshly fetched statistics
    pub async fn set(
        &self,
        query: StatsQuery,
        document: Value,
        period_year: Option<i32>,
    ) -> CacheResult<CacheReply> {
        Ok(self
            .request(CacheRequest::Set {
                query,
                document,
                period_year,
            })
            .await?
            .reply)
    }

    /// Remove records for one community, or everything when none is given
    pub async fn invalidate(&self, community_id: Option<String>) -> CacheResult<CacheReply> {
        Ok(self
            .request(CacheRequest::Invalidate { community_id })
            .await?
            .reply)
    }

    /// Remove every record
    pub async fn clear(&self) -> CacheResult<CacheReply> {
        Ok(self.request(CacheRequest::Clear).await?.reply)
    }

    /// Introspection: entry count, capacity, and counters
    pub async fn stats(&self) -> CacheResult<CacheReply> {
        Ok(self.request(CacheRequest::Stats).await?.reply)
    }
}
