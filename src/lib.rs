//! # scenesync
//!
//! Change-aware serializer that mirrors a retained-mode 3D scene graph
//! (render windows, renderers, actors, mappers, datasets) to a remote
//! client which rebuilds and renders it.
//!
//! Every snapshot is a tree of instance descriptors. Bulk array data is
//! never inlined: arrays are referenced by content hash and fetched on
//! demand, so unchanged or shared geometry is transmitted once. Child
//! collections are sent as add/remove calls relative to the previous
//! snapshot.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (scalar types, errors, diagnostics)
//! - [`scene`] - Scene object model and geometry normalization
//! - [`core`] - Hash and array caches, dependency diffing, wire types
//! - [`serialize`] - Registry-driven recursive scene serializer
//!
//! ## Example
//!
//! ```ignore
//! use scenesync::prelude::*;
//!
//! let serializer = SceneSerializer::default();
//! let mut ctx = SynchronizationContext::new(SyncOptions::default());
//!
//! if let Some(tree) = serializer.serialize(&window, &mut ctx) {
//!     println!("{}", tree.to_json()?);
//!     for hash in tree.array_hashes() {
//!         let payload = ctx.fetch_array(&hash)?;
//!         send(&hash, payload.as_bytes());
//!     }
//! }
//! ctx.sweep();
//! ```

pub mod util;
pub mod scene;
pub mod core;
pub mod serialize;

// Re-export commonly used types
pub use util::{Error, Result, ScalarType};
pub use core::{InstanceDescriptor, SyncOptions, SynchronizationContext};
pub use serialize::{InstanceRegistry, SceneSerializer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Diagnostic, Error, Result, ScalarType};
    pub use crate::core::{
        ArrayDescriptor, ArrayEncoding, ArrayPayload, InstanceDescriptor, MethodCall, SyncOptions,
        SynchronizationContext,
    };
    pub use crate::serialize::{InstanceRegistry, SceneSerializer, SerializerFn, Visit};
    pub use crate::scene::*;
}
