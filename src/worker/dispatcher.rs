//! The cache worker loop
//!
//! A single task owns the engine (and through it the record store) and
//! drains the request channel in submission order. Engine errors are
//! folded into `Failed` replies; a failing request never affects the
//! requests queued behind it.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::handle::CacheHandle;
use super::messages::{CacheReply, CacheRequest, RequestEnvelope, ResponseEnvelope};
use crate::cache::{Lookup, StatsCacheEngine};

/// Dispatcher that executes cache requests against the engine
pub struct CacheWorker {
    engine: StatsCacheEngine,
    rx: mpsc::Receiver<RequestEnvelope>,
}

impl CacheWorker {
    pub fn new(engine: StatsCacheEngine, rx: mpsc::Receiver<RequestEnvelope>) -> Self {
        Self { engine, rx }
    }

    /// Spawn the worker onto the runtime and hand back the caller side
    pub fn spawn(
        engine: StatsCacheEngine,
        queue_depth: usize,
        cancellation_token: CancellationToken,
    ) -> (CacheHandle, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_depth);
        let worker = CacheWorker::new(engine, rx);
        let join_handle = tokio::spawn(worker.run(cancellation_token));
        (CacheHandle::new(tx), join_handle)
    }

    /// Run the dispatch loop until cancellation or until every handle is gone
    pub async fn run(mut self, cancellation_token: CancellationToken) {
        info!("Cache worker started");

        loop {
            tokio::select! {
                envelope = self.rx.recv() => {
                    match envelope {
                        Some(envelope) => self.handle(envelope).await,
                        None => {
                            info!("Cache request channel closed, worker stopping");
                            break;
                        }
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Cache worker received cancellation signal");
                    break;
                }
            }
        }

        info!("Cache worker stopped");
    }

    /// Execute one request and emit exactly one response for it
    async fn handle(&self, envelope: RequestEnvelope) {
        let RequestEnvelope {
            request_id,
            request,
            reply,
        } = envelope;
        let kind = request.kind();

        let outcome = match request {
            CacheRequest::Get { query } => self.engine.get(&query).await.map(|lookup| match lookup {
                Lookup::Hit {
                    document,
                    stored_at,
                    period_year,
                } => CacheReply::Hit {
                    document,
                    stored_at,
                    period_year,
                },
                Lookup::Miss => CacheReply::Miss,
            }),
            CacheRequest::Set {
                query,
                document,
                period_year,
            } => self
                .engine
                .set(&query, &document, period_year)
                .await
                .map(|stored| CacheReply::Stored {
                    cache_key: stored.cache_key,
                    compression_ratio: stored.compression_ratio,
                }),
            CacheRequest::Invalidate { community_id } => self
                .engine
                .invalidate(community_id.as_deref())
                .await
                .map(|removed| CacheReply::Invalidated { removed }),
            CacheRequest::Clear => self
                .engine
                .clear()
                .await
                .map(|removed| CacheReply::Cleared { removed }),
            CacheRequest::Stats => self.engine.stats().await.map(CacheReply::Stats),
        };

        let reply_body = match outcome {
            Ok(reply_body) => reply_body,
            Err(e) => {
                error!("Cache {} request {} failed: {}", kind, request_id, e);
                CacheReply::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if reply
            .send(ResponseEnvelope {
                request_id,
                reply: reply_body,
            })
            .is_err()
        {
            // Caller gave up (timeout on the rendering side); nothing to do
            debug!("Cache {} response {} had no listener", kind, request_id);
        }
    }
}
