//! Error type definitions for the statistics cache
//!
//! This module defines all error types used throughout the cache, providing
//! a hierarchical error system that makes debugging and error handling more
//! straightforward. Errors never cross the worker's message boundary as
//! panics; the dispatcher folds them into failed response envelopes.

use thiserror::Error;

/// Top-level cache error type
///
/// This enum represents all possible errors that can occur in the cache.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Compression or decompression failures on the payload blob
    ///
    /// On the read path the engine treats this as a cache miss rather than
    /// a caller-visible fault; on the write path it fails the single
    /// request that triggered it.
    #[error("Codec error: {0}")]
    Codec(#[source] std::io::Error),

    /// Payload (de)serialization failures
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row that no longer maps onto the domain model
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The dispatcher channel closed before a response was delivered
    #[error("Dispatch error: {message}")]
    Dispatch { message: String },
}

impl CacheError {
    /// Build a configuration error from any displayable message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True when this error came out of the codec (corrupt or truncated
    /// blob), which read paths downgrade to a miss.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}
