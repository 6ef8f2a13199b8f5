//! Asynchronous request dispatcher for the cache engine
//!
//! The rendering side and the cache communicate exclusively through typed
//! request/response envelopes over an mpsc channel; every request carries a
//! correlation id that is echoed on its single response. The worker
//! executes requests strictly in submission order, which gives FIFO
//! dequeue and read-after-write for a `Set` followed by a `Get` on the
//! same key. Once dequeued a request runs to completion; callers apply
//! their own timeouts and treat a non-response as a miss.

pub mod dispatcher;
pub mod handle;
pub mod messages;

pub use dispatcher::CacheWorker;
pub use handle::CacheHandle;
pub use messages::{CacheReply, CacheRequest, RequestEnvelope, ResponseEnvelope};
