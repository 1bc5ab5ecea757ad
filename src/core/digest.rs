//! Content hashes of data arrays.
//!
//! A hash is the MD5 of the array's backing bytes, base64 encoded with the
//! trailing `==` stripped, suffixed with `_<size><typeCode>`. Identical
//! content of the same type and size always yields the same key, whatever
//! object it lives in.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};

use crate::scene::{DataArray, ObjectId};
use crate::util::{Error, Result};

/// 128-bit MD5 digest.
pub type ArrayDigest = [u8; 16];

/// Compute the MD5 digest of raw bytes.
#[inline]
pub fn compute_digest(data: &[u8]) -> ArrayDigest {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Content hash of an array, ignoring any memoization.
pub fn hash_array(array: &DataArray) -> String {
    let data = array.read();
    let encoded = STANDARD.encode(compute_digest(data.as_bytes()));
    let md5sum = encoded.strip_suffix("==").unwrap_or(&encoded);
    format!("{}_{}{}", md5sum, data.len(), data.scalar_type().type_code())
}

#[derive(Debug)]
struct HashRecord {
    hash: String,
    mtime: u64,
    array: Weak<DataArray>,
}

/// Memoized array hashes keyed by array identity.
///
/// A record is reused while the array's modification time is unchanged.
#[derive(Debug, Default)]
pub struct HashCache {
    records: HashMap<ObjectId, HashRecord>,
    hits: usize,
    misses: usize,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of `array`, recomputed only if it was modified since last time.
    ///
    /// Empty arrays have no meaningful content key and are rejected.
    pub fn digest(&mut self, array: &Arc<DataArray>) -> Result<String> {
        let id = array.object_id();
        let mtime = array.mtime();

        if let Some(record) = self.records.get(&id) {
            if record.mtime == mtime {
                self.hits += 1;
                return Ok(record.hash.clone());
            }
        }

        if array.is_empty() {
            return Err(Error::EmptyArray(array.name().unwrap_or("<unnamed>").to_string()));
        }

        self.misses += 1;
        let hash = hash_array(array);
        self.records.insert(id, HashRecord {
            hash: hash.clone(),
            mtime,
            array: Arc::downgrade(array),
        });
        Ok(hash)
    }

    /// Drop records whose array no longer exists. Returns the number dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.array.strong_count() > 0);
        before - self.records.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of digests served from memo.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of digests computed.
    pub fn misses(&self) -> usize {
        self.misses
    }
}
