//! Core layer - caches and wire types of the synchronization protocol.
//!
//! This module provides:
//! - [`HashCache`] - memoized content hashes of data arrays
//! - [`ArrayCache`] - hash-addressed arrays awaiting transmission
//! - [`DependencyDiffer`] - add/remove calls between snapshots
//! - [`InstanceDescriptor`] / [`ArrayDescriptor`] - the snapshot wire format
//! - [`SynchronizationContext`] - per-client state tying the above together

mod array_cache;
mod compression;
mod context;
mod dependency;
mod descriptor;
mod digest;
mod options;

pub use array_cache::{wire_bytes, ArrayCache, ArrayEncoding, ArrayPayload, CacheRecord};
pub use compression::{decode_base64, encode_base64, entry_name, unzip_payload, zip_payload};
pub use context::SynchronizationContext;
pub use dependency::{DependencyDiffer, DependencyOp, Operation, Relation, RelationKey};
pub use descriptor::{
    unwrap_id, wrap_id, ArrayDescriptor, FieldLocation, InstanceDescriptor, MethodCall, RangeInfo,
    Registration, INSTANCE_PREFIX,
};
pub use digest::{compute_digest, hash_array, ArrayDigest, HashCache};
pub use options::{SyncOptions, DEFAULT_SWEEP_MAX_AGE_SECS};
