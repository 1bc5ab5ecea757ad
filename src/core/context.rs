//! State shared by every snapshot of one client session.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::array_cache::{ArrayCache, ArrayEncoding, ArrayPayload};
use super::dependency::DependencyDiffer;
use super::digest::HashCache;
use super::options::SyncOptions;
use crate::scene::DataArray;
use crate::util::Result;

/// Caches and relation snapshots that persist across serializations.
///
/// One context serves one receiving client. Snapshots taken with the same
/// context send only what changed since the previous one.
#[derive(Debug, Default)]
pub struct SynchronizationContext {
    options: SyncOptions,
    hashes: HashCache,
    arrays: ArrayCache,
    dependencies: DependencyDiffer,
}

impl SynchronizationContext {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.options.debug = debug;
    }

    pub fn set_ignore_last_dependencies(&mut self, ignore: bool) {
        self.options.ignore_last_dependencies = ignore;
    }

    pub fn set_compression(&mut self, compression: bool) {
        self.options.compression = compression;
    }

    pub fn set_binary(&mut self, binary: bool) {
        self.options.binary = binary;
    }

    pub fn hash_cache(&self) -> &HashCache {
        &self.hashes
    }

    pub fn array_cache(&self) -> &ArrayCache {
        &self.arrays
    }

    pub fn dependencies(&self) -> &DependencyDiffer {
        &self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut DependencyDiffer {
        &mut self.dependencies
    }

    /// Hash `array` and register it for fetching.
    pub fn cache_array(&mut self, array: &Arc<DataArray>) -> Result<String> {
        let mtime = array.mtime();
        let hash = self.hashes.digest(array)?;
        self.arrays.put(hash.clone(), array, mtime);
        Ok(hash)
    }

    /// Payload of a cached array in the configured encoding.
    pub fn fetch_array(&mut self, hash: &str) -> Result<ArrayPayload> {
        let encoding = self.options.encoding();
        self.fetch_array_with(hash, encoding)
    }

    pub fn fetch_array_with(&mut self, hash: &str, encoding: ArrayEncoding) -> Result<ArrayPayload> {
        self.arrays.get(hash, encoding)
    }

    /// Evict idle unreferenced arrays using the configured age.
    pub fn sweep(&mut self) -> usize {
        self.sweep_with(self.options.sweep_max_age())
    }

    pub fn sweep_with(&mut self, max_age: Duration) -> usize {
        let evicted = self.arrays.sweep(max_age);
        let pruned = self.hashes.prune();
        debug!(evicted, pruned, remaining = self.arrays.len(), "swept array cache");
        evicted
    }
}
