//! Scene serialization - recursive descent from a render window to an
//! [`InstanceDescriptor`] tree.
//!
//! Each node is dispatched by class name through an [`InstanceRegistry`].
//! A node whose required children fail to serialize is dropped together
//! with its subtree; the rest of the snapshot is still produced.
//!
//! # Example
//!
//! ```ignore
//! use scenesync::prelude::*;
//!
//! let serializer = SceneSerializer::default();
//! let mut ctx = SynchronizationContext::new(SyncOptions::default());
//! let tree = serializer.serialize(&window, &mut ctx);
//! ```

use tracing::{debug, info_span};

use crate::core::{InstanceDescriptor, MethodCall, SynchronizationContext};
use crate::scene::{NodeRef, RenderWindow, SceneObject, ROOT_PARENT};
use crate::util::Diagnostic;

/// Debug-gated traversal diagnostic, indented by depth.
macro_rules! diagnose {
    ($ctx:expr, $depth:expr, $kind:expr, $($arg:tt)+) => {
        if $ctx.options().debug {
            tracing::debug!(kind = %$kind, "{}{}", $crate::serialize::pad($depth), format_args!($($arg)+));
        }
    };
}

mod actor;
mod color;
mod dataset;
mod fields;
mod mapper;
mod property;
mod registry;
mod render;

pub use fields::{describe_array, extract_fields};
pub use registry::{InstanceRegistry, SerializerFn};

/// Two spaces per depth level.
pub fn pad(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Integer form of a flag, as the client expects.
#[inline]
pub(crate) fn flag(value: bool) -> i32 {
    i32::from(value)
}

/// One node being serialized, with the node that reached it.
#[derive(Clone, Debug)]
pub struct Visit<'a> {
    pub parent: Option<NodeRef<'a>>,
    pub node: NodeRef<'a>,
    /// Instance id assigned by the parent.
    pub id: String,
    pub depth: usize,
}

impl<'a> Visit<'a> {
    pub fn root(node: NodeRef<'a>, id: impl Into<String>) -> Self {
        Self { parent: None, node, id: id.into(), depth: 0 }
    }

    /// Visit of a child of this node.
    pub fn child(&self, node: NodeRef<'a>, id: impl Into<String>) -> Self {
        Self {
            parent: Some(self.node),
            node,
            id: id.into(),
            depth: self.depth + 1,
        }
    }

    /// Instance id of the parent, `0x0` without one.
    pub fn parent_id(&self) -> String {
        self.parent
            .map(|p| p.object_id().to_string())
            .unwrap_or_else(|| ROOT_PARENT.to_string())
    }

    /// Report a serializer registered for the wrong node kind.
    pub(crate) fn mismatch(&self, ctx: &SynchronizationContext, expected: &str) -> Option<InstanceDescriptor> {
        diagnose!(
            ctx,
            self.depth,
            Diagnostic::MissingAccessor,
            "{} {} cannot be serialized as {}",
            self.node.class_name(),
            self.id,
            expected
        );
        None
    }
}

/// Children collected while serializing a composite node.
#[derive(Debug, Default)]
pub(crate) struct Fragments {
    pub calls: Vec<MethodCall>,
    pub dependencies: Vec<InstanceDescriptor>,
}

impl Fragments {
    /// Serialize a child and, on success, record it with a `method` call
    /// referencing it. Returns whether the child serialized.
    pub fn attach<'a>(
        &mut self,
        serializer: &SceneSerializer,
        ctx: &mut SynchronizationContext,
        visit: &Visit<'a>,
        node: NodeRef<'a>,
        id: String,
        method: &str,
    ) -> bool {
        let child = visit.child(node, id);
        match serializer.serialize_instance(ctx, &child) {
            Some(instance) => {
                self.calls.push(MethodCall::with_instance(method, &child.id));
                self.dependencies.push(instance);
                true
            }
            None => false,
        }
    }

    /// Serialize a child without a call; returns its id on success.
    pub fn collect<'a>(
        &mut self,
        serializer: &SceneSerializer,
        ctx: &mut SynchronizationContext,
        visit: &Visit<'a>,
        node: NodeRef<'a>,
        id: String,
    ) -> Option<String> {
        let child = visit.child(node, id);
        let instance = serializer.serialize_instance(ctx, &child)?;
        self.dependencies.push(instance);
        Some(child.id)
    }

    pub fn finish(self, descriptor: InstanceDescriptor) -> InstanceDescriptor {
        descriptor.with_calls(self.calls).with_dependencies(self.dependencies)
    }
}

/// Walks a scene and produces snapshot trees.
#[derive(Debug, Clone)]
pub struct SceneSerializer {
    registry: InstanceRegistry,
}

impl SceneSerializer {
    pub fn new(registry: InstanceRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Snapshot of `window`. Arrays referenced by the tree are registered
    /// in `ctx` for fetching; relation snapshots in `ctx` advance.
    pub fn serialize(&self, window: &RenderWindow, ctx: &mut SynchronizationContext) -> Option<InstanceDescriptor> {
        let _span = info_span!("serialize", window = %window.object_id()).entered();
        let visit = Visit::root(window.as_node(), window.reference_id());
        let tree = self.serialize_instance(ctx, &visit);
        debug!(
            produced = tree.is_some(),
            cached_arrays = ctx.array_cache().len(),
            "snapshot complete"
        );
        tree
    }

    /// Serialize one node through the registry.
    ///
    /// Unregistered class names yield `None`.
    pub fn serialize_instance(&self, ctx: &mut SynchronizationContext, visit: &Visit<'_>) -> Option<InstanceDescriptor> {
        let class_name = visit.node.class_name();
        match self.registry.resolve(class_name) {
            Some(serializer) => serializer(self, ctx, visit),
            None => {
                diagnose!(
                    ctx,
                    visit.depth,
                    Diagnostic::UnsupportedType,
                    "!!!No serializer for {} with id {}",
                    class_name,
                    visit.id
                );
                None
            }
        }
    }
}

impl Default for SceneSerializer {
    fn default() -> Self {
        Self::new(InstanceRegistry::with_defaults())
    }
}
