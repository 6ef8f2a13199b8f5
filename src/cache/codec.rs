//! Payload codec: gzip over a UTF-8 JSON serialization
//!
//! The document is opaque to the cache; it is serialized to JSON and
//! gzip-compressed on the way in, and reversed on the way out. The
//! compression ratio is reported for observability only and never affects
//! correctness. A corrupt or truncated blob on decompression is a
//! recoverable error: the engine downgrades it to a cache miss.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

use crate::errors::{CacheError, CacheResult};

/// A compressed payload plus its observed compression ratio
#[derive(Debug, Clone)]
pub struct CompressedDocument {
    pub bytes: Vec<u8>,
    /// `uncompressed_len / compressed_len`; larger is better
    pub compression_ratio: f64,
}

/// Compress a document to a gzip blob
pub fn compress(document: &serde_json::Value) -> CacheResult<CompressedDocument> {
    let serialized = serde_json::to_vec(document)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&serialized)
        .map_err(CacheError::Codec)?;
    let bytes = encoder.finish().map_err(CacheError::Codec)?;

    let compression_ratio = if bytes.is_empty() {
        1.0
    } else {
        serialized.len() as f64 / bytes.len() as f64
    };

    Ok(CompressedDocument {
        bytes,
        compression_ratio,
    })
}

/// Decompress a gzip blob back into a document
pub fn decompress(blob: &[u8]) -> CacheResult<serde_json::Value> {
    let mut decoder = GzDecoder::new(blob);
    let mut serialized = Vec::new();
    decoder
        .read_to_end(&mut serialized)
        .map_err(CacheError::Codec)?;

    Ok(serde_json::from_slice(&serialized)?)
}

/// True when a decode failure should be treated as a miss rather than a
/// caller-visible fault (corrupt gzip stream or unparseable JSON inside it)
pub fn is_recoverable_decode_failure(error: &CacheError) -> bool {
    matches!(error, CacheError::Codec(_) | CacheError::Serialization(_))
}
