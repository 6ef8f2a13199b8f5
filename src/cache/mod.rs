//! The caching core: key derivation, payload codec, expiry, and the engine
//!
//! Everything in here is orchestrated by [`engine::StatsCacheEngine`] and
//! exposed to callers through the worker's message protocol
//! (`crate::worker`). The engine owns the record store exclusively; the
//! rendering side never touches storage directly.

pub mod codec;
pub mod engine;
pub mod expiry;
pub mod key;

pub use engine::{Lookup, StatsCacheEngine, StoreOutcome};
pub use expiry::ExpiryPolicy;
pub use key::KeyDeriver;
