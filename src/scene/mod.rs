//! Scene object model.
//!
//! The read-only view of a retained-mode scene that the serializer walks:
//! render windows, renderers, props, mappers, datasets, color maps,
//! cameras and lights. Optional relationships are explicit `Option`s, so
//! the serializer never has to probe an object for an accessor.
//!
//! - [`ObjectId`] - stable identity token of every scene object
//! - [`SceneObject`] / [`NodeRef`] - class-name discriminated view of a node
//! - [`DataArray`] - shared typed buffers with modification times
//! - [`geometry`] - normalization of composite/unstructured data to polygons

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Implement [`SceneObject`] for structs with `id` and `class_name` fields.
macro_rules! impl_scene_object {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl $crate::scene::SceneObject for $ty {
            fn class_name(&self) -> &str {
                &self.class_name
            }

            fn object_id(&self) -> $crate::scene::ObjectId {
                self.id.get()
            }

            fn as_node(&self) -> $crate::scene::NodeRef<'_> {
                $crate::scene::NodeRef::$variant(self)
            }
        })*
    };
}

mod array;
mod dataset;
pub mod geometry;
mod pipeline;
mod render;

pub use array::{cell_array, count_cells, ArrayData, DataArray};
pub use dataset::{
    Cell, CellType, DataObject, DataSetAttributes, ImageData, MultiBlockDataSet, PolyData,
    UnstructuredGrid,
};
pub use pipeline::{
    Actor, ColorMap, ColorTransferFunction, LookupTable, Mapper, OpaqueObject, Property,
    Representation, ScalarMode, Texture, ViewProp,
};
pub use render::{Camera, Light, LightType, RenderWindow, Renderer};

/// Parent address reported for the root of an instance tree.
pub const ROOT_PARENT: &str = "0x0";

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_MTIME: AtomicU64 = AtomicU64::new(1);

/// Next value of the global modification clock.
pub(crate) fn next_mtime() -> u64 {
    NEXT_MTIME.fetch_add(1, Ordering::Relaxed)
}

/// Stable identity of a scene object.
///
/// Assigned once when the object is created and never re-derived, so the
/// same live object maps to the same instance id in every snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an identity token supplied by the embedding scene library.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identity slot of a scene node.
///
/// Cloning allocates a fresh [`ObjectId`]: a copied node is a separate
/// instance on the client. Nodes meant to be shared are held in an `Arc`.
#[derive(Debug)]
pub(crate) struct Identity(ObjectId);

impl Identity {
    pub(crate) fn new() -> Self {
        Self(ObjectId::next())
    }

    #[inline]
    pub(crate) fn get(&self) -> ObjectId {
        self.0
    }
}

impl Clone for Identity {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    /// Fixed-width 16 digit hex, the form used as instance id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Borrowed, kind-tagged view of one scene node.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    RenderWindow(&'a RenderWindow),
    Renderer(&'a Renderer),
    Camera(&'a Camera),
    Light(&'a Light),
    Actor(&'a Actor),
    Mapper(&'a Mapper),
    Texture(&'a Texture),
    Property(&'a Property),
    LookupTable(&'a LookupTable),
    ColorTransferFunction(&'a ColorTransferFunction),
    PolyData(&'a PolyData),
    ImageData(&'a ImageData),
    UnstructuredGrid(&'a UnstructuredGrid),
    MultiBlock(&'a MultiBlockDataSet),
    Opaque(&'a OpaqueObject),
}

impl<'a> NodeRef<'a> {
    fn object(&self) -> &'a dyn SceneObject {
        match *self {
            Self::RenderWindow(o) => o,
            Self::Renderer(o) => o,
            Self::Camera(o) => o,
            Self::Light(o) => o,
            Self::Actor(o) => o,
            Self::Mapper(o) => o,
            Self::Texture(o) => o,
            Self::Property(o) => o,
            Self::LookupTable(o) => o,
            Self::ColorTransferFunction(o) => o,
            Self::PolyData(o) => o,
            Self::ImageData(o) => o,
            Self::UnstructuredGrid(o) => o,
            Self::MultiBlock(o) => o,
            Self::Opaque(o) => o,
        }
    }

    pub fn class_name(&self) -> &'a str {
        self.object().class_name()
    }

    pub fn object_id(&self) -> ObjectId {
        self.object().object_id()
    }

    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RenderWindow(_) => "render-window",
            Self::Renderer(_) => "renderer",
            Self::Camera(_) => "camera",
            Self::Light(_) => "light",
            Self::Actor(_) => "actor",
            Self::Mapper(_) => "mapper",
            Self::Texture(_) => "texture",
            Self::Property(_) => "property",
            Self::LookupTable(_) => "lookup-table",
            Self::ColorTransferFunction(_) => "color-transfer-function",
            Self::PolyData(_) => "polydata",
            Self::ImageData(_) => "imagedata",
            Self::UnstructuredGrid(_) => "unstructured-grid",
            Self::MultiBlock(_) => "multiblock",
            Self::Opaque(_) => "opaque",
        }
    }
}

/// Introspection every scene object offers.
pub trait SceneObject: fmt::Debug {
    /// Class-name discriminator, e.g. `vtkOpenGLActor`.
    fn class_name(&self) -> &str;

    /// Identity token.
    fn object_id(&self) -> ObjectId;

    /// Kind-tagged view of this object.
    fn as_node(&self) -> NodeRef<'_>;

    /// Instance id string derived from the identity token.
    fn reference_id(&self) -> String {
        self.object_id().to_string()
    }
}
