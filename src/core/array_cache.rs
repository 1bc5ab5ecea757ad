//! Hash-addressed store of arrays awaiting transmission.
//!
//! The serializer registers every array it describes; the client then
//! fetches payloads by hash. Records keep a strong handle to the array, so
//! an array shared by several datasets is stored and sent once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use super::compression::{encode_base64, zip_payload};
use crate::scene::{ArrayData, DataArray};
use crate::util::{narrow_to_u32, narrow_unsigned_to_u32, Diagnostic, Error, Result};

/// How a payload should be encoded on fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrayEncoding {
    /// Return raw bytes instead of base64 text.
    pub binary: bool,
    /// Wrap the bytes in a zip container first.
    pub compressed: bool,
}

impl ArrayEncoding {
    pub const fn new(binary: bool, compressed: bool) -> Self {
        Self { binary, compressed }
    }
}

/// Encoded array content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayPayload {
    Binary(Vec<u8>),
    Text(String),
}

impl ArrayPayload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Binary(b) => b,
            Self::Text(t) => t.as_bytes(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

/// Bytes sent for an array's current content.
///
/// 64-bit integers are narrowed to `u32`; values that do not fit saturate
/// to `u32::MAX`.
pub fn wire_bytes(data: &ArrayData) -> Vec<u8> {
    match data {
        ArrayData::Int64(v) | ArrayData::IdType(v) => bytemuck::cast_slice(&narrow_to_u32(v)).to_vec(),
        ArrayData::Uint64(v) => bytemuck::cast_slice(&narrow_unsigned_to_u32(v)).to_vec(),
        other => other.as_bytes().to_vec(),
    }
}

/// One cached array.
#[derive(Debug)]
pub struct CacheRecord {
    pub hash: String,
    array: Arc<DataArray>,
    /// Array modification time when the record was written.
    pub mtime: u64,
    pub last_access: Instant,
}

impl CacheRecord {
    pub fn array(&self) -> &Arc<DataArray> {
        &self.array
    }

    /// Holders of the array other than this record.
    pub fn external_refs(&self) -> usize {
        Arc::strong_count(&self.array) - 1
    }

    /// True if the array changed after it was registered.
    pub fn is_stale(&self) -> bool {
        self.mtime != self.array.mtime()
    }
}

/// Map of hash to cached array.
#[derive(Debug, Default)]
pub struct ArrayCache {
    records: HashMap<String, CacheRecord>,
    stale_reads: usize,
}

impl ArrayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `array` under `hash`, replacing any previous record.
    ///
    /// One record per hash: when several live arrays share a content hash,
    /// the record tracks whichever was registered last.
    pub fn put(&mut self, hash: impl Into<String>, array: &Arc<DataArray>, mtime: u64) {
        let hash = hash.into();
        self.records.insert(hash.clone(), CacheRecord {
            hash,
            array: Arc::clone(array),
            mtime,
            last_access: Instant::now(),
        });
    }

    /// Encode the array registered under `hash` and refresh its access time.
    ///
    /// Bytes come from the array's current content. If the array changed
    /// since registration the read is counted and logged, not refused.
    pub fn get(&mut self, hash: &str, encoding: ArrayEncoding) -> Result<ArrayPayload> {
        let record = self
            .records
            .get_mut(hash)
            .ok_or_else(|| Error::ArrayNotCached(hash.to_string()))?;

        if record.is_stale() {
            self.stale_reads += 1;
            warn!(kind = %Diagnostic::StaleCacheRead, hash, "array modified since it was registered");
        }
        record.last_access = Instant::now();

        let bytes = wire_bytes(&record.array.read());
        let bytes = if encoding.compressed { zip_payload(hash, &bytes)? } else { bytes };

        Ok(if encoding.binary {
            ArrayPayload::Binary(bytes)
        } else {
            ArrayPayload::Text(encode_base64(&bytes))
        })
    }

    /// Evict records nobody else references that were not accessed within
    /// `max_age`. Returns the number evicted.
    ///
    /// Only the array held by the record counts. An equal-content array
    /// registered earlier under the same hash does not keep it alive; the
    /// next serialization registers it again.
    pub fn sweep(&mut self, max_age: Duration) -> usize {
        let before = self.records.len();
        self.records.retain(|hash, record| {
            let evict = record.external_refs() == 0 && record.last_access.elapsed() >= max_age;
            if evict {
                trace!(hash = hash.as_str(), "evicting cached array");
            }
            !evict
        });
        before - self.records.len()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.records.contains_key(hash)
    }

    pub fn record(&self, hash: &str) -> Option<&CacheRecord> {
        self.records.get(hash)
    }

    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads served after the backing array changed.
    pub fn stale_reads(&self) -> usize {
        self.stale_reads
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
