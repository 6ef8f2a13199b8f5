//! Centralized error handling for the statistics cache worker
//!
//! This module provides the error types shared across all layers of the
//! cache: storage, codec, configuration, and the message-dispatch boundary.
//!
//! # Error Categories
//!
//! - **Database Errors**: SQLite operations, migrations, connection issues
//! - **Codec Errors**: gzip/JSON failures while (de)serializing payloads
//! - **Configuration Errors**: invalid TTLs, capacity, or database settings
//! - **Dispatch Errors**: the worker channel closed before a reply arrived

pub mod types;

pub use types::*;

/// Convenience type alias for Results using CacheError
pub type CacheResult<T> = std::result::Result<T, CacheError>;
