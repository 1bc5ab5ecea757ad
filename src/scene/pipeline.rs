//! Rendering pipeline objects: props, mappers, color maps, textures.
//!
//! Defaults follow the VTK defaults for each class.

use std::sync::Arc;

use glam::DMat4;

use super::{DataObject, Identity, NodeRef, SceneObject};

/// Which attribute data a mapper colors by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ScalarMode {
    /// Active point scalars, falling back to active cell scalars.
    #[default]
    Default = 0,
    UsePointData = 1,
    UseCellData = 2,
    UsePointFieldData = 3,
    UseCellFieldData = 4,
    UseFieldData = 5,
}

/// Surface representation of a [`Property`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Representation {
    Points = 0,
    Wireframe = 1,
    #[default]
    Surface = 2,
}

/// Indexed color table.
#[derive(Clone, Debug)]
pub struct LookupTable {
    id: Identity,
    pub class_name: String,
    pub number_of_colors: usize,
    /// Scalar range mapped onto the table.
    pub table_range: [f64; 2],
    pub hue_range: [f64; 2],
    pub saturation_range: [f64; 2],
    pub nan_color: [f64; 4],
    pub below_range_color: [f64; 4],
    pub above_range_color: [f64; 4],
    pub use_above_range_color: bool,
    pub use_below_range_color: bool,
    pub alpha: f64,
    pub vector_size: i32,
    pub vector_component: i32,
    pub vector_mode: i32,
    pub indexed_lookup: bool,
}

impl LookupTable {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkLookupTable".into(),
            number_of_colors: 256,
            table_range: [0.0, 1.0],
            hue_range: [0.0, 0.66667],
            saturation_range: [1.0, 1.0],
            nan_color: [0.5, 0.0, 0.0, 1.0],
            below_range_color: [0.0, 0.0, 0.0, 1.0],
            above_range_color: [1.0, 1.0, 1.0, 1.0],
            use_above_range_color: false,
            use_below_range_color: false,
            alpha: 1.0,
            vector_size: -1,
            vector_component: 0,
            vector_mode: 1,
            indexed_lookup: false,
        }
    }

    pub fn with_colors(mut self, n: usize) -> Self {
        self.number_of_colors = n;
        self
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Piecewise color function over scalar values.
#[derive(Clone, Debug)]
pub struct ColorTransferFunction {
    id: Identity,
    pub class_name: String,
    /// `[x, r, g, b, midpoint, sharpness]` per node.
    pub nodes: Vec<[f64; 6]>,
    pub clamping: bool,
    pub color_space: i32,
    pub hsv_wrap: bool,
    pub allow_duplicate_scalars: bool,
    pub alpha: f64,
    pub vector_component: i32,
    pub vector_size: i32,
    pub vector_mode: i32,
    pub indexed_lookup: bool,
}

impl ColorTransferFunction {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkColorTransferFunction".into(),
            nodes: Vec::new(),
            clamping: true,
            color_space: 1,
            hsv_wrap: true,
            allow_duplicate_scalars: false,
            alpha: 1.0,
            vector_component: 0,
            vector_size: -1,
            vector_mode: 1,
            indexed_lookup: false,
        }
    }

    /// Append an RGB point with default midpoint/sharpness.
    pub fn add_rgb_point(&mut self, x: f64, r: f64, g: f64, b: f64) {
        self.nodes.push([x, r, g, b, 0.5, 0.0]);
        self.nodes.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }
}

impl Default for ColorTransferFunction {
    fn default() -> Self {
        Self::new()
    }
}

/// Color table a mapper maps scalars through.
///
/// Held by `Arc` so several mappers can share one table instance.
#[derive(Clone, Debug)]
pub enum ColorMap {
    LookupTable(Arc<LookupTable>),
    TransferFunction(Arc<ColorTransferFunction>),
}

impl ColorMap {
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Self::LookupTable(t) => t.as_node(),
            Self::TransferFunction(t) => t.as_node(),
        }
    }
}

impl From<LookupTable> for ColorMap {
    fn from(t: LookupTable) -> Self {
        Self::LookupTable(Arc::new(t))
    }
}

impl From<Arc<LookupTable>> for ColorMap {
    fn from(t: Arc<LookupTable>) -> Self {
        Self::LookupTable(t)
    }
}

impl From<ColorTransferFunction> for ColorMap {
    fn from(t: ColorTransferFunction) -> Self {
        Self::TransferFunction(Arc::new(t))
    }
}

impl From<Arc<ColorTransferFunction>> for ColorMap {
    fn from(t: Arc<ColorTransferFunction>) -> Self {
        Self::TransferFunction(t)
    }
}

/// Maps a dataset to renderable primitives.
#[derive(Clone, Debug)]
pub struct Mapper {
    id: Identity,
    pub class_name: String,
    pub input: Option<DataObject>,
    pub lookup_table: Option<ColorMap>,
    pub resolve_coincident_topology: i32,
    pub render_time: f64,
    pub array_access_mode: i32,
    pub scalar_range: [f64; 2],
    pub use_lookup_table_scalar_range: bool,
    pub scalar_visibility: bool,
    /// Array colored by when the scalar mode selects by name.
    pub array_name: Option<String>,
    pub color_mode: i32,
    pub scalar_mode: ScalarMode,
    pub interpolate_scalars_before_mapping: bool,
}

impl Mapper {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLPolyDataMapper".into(),
            input: None,
            lookup_table: None,
            resolve_coincident_topology: 0,
            render_time: 0.0,
            array_access_mode: 0,
            scalar_range: [0.0, 1.0],
            use_lookup_table_scalar_range: false,
            scalar_visibility: true,
            array_name: None,
            color_mode: 0,
            scalar_mode: ScalarMode::Default,
            interpolate_scalars_before_mapping: false,
        }
    }

    pub fn with_input(mut self, input: impl Into<DataObject>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_lookup_table(mut self, table: impl Into<ColorMap>) -> Self {
        self.lookup_table = Some(table.into());
        self
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Image applied to an actor's surface.
#[derive(Clone, Debug)]
pub struct Texture {
    id: Identity,
    pub class_name: String,
    pub input: Option<DataObject>,
    pub interpolate: bool,
    pub repeat: bool,
    pub edge_clamp: bool,
}

impl Texture {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLTexture".into(),
            input: None,
            interpolate: false,
            repeat: true,
            edge_clamp: false,
        }
    }

    pub fn with_input(mut self, input: impl Into<DataObject>) -> Self {
        self.input = Some(input.into());
        self
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface appearance of an actor.
///
/// `representation`, `diffuse_color` and `color` are optional because not
/// every property class exposes them.
#[derive(Clone, Debug)]
pub struct Property {
    id: Identity,
    pub class_name: String,
    pub representation: Option<Representation>,
    pub color: Option<[f64; 3]>,
    pub diffuse_color: Option<[f64; 3]>,
    pub ambient_color: [f64; 3],
    pub specular_color: [f64; 3],
    pub edge_color: [f64; 3],
    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub specular_power: f64,
    pub opacity: f64,
    pub interpolation: i32,
    pub edge_visibility: bool,
    pub backface_culling: bool,
    pub frontface_culling: bool,
    pub point_size: f64,
    pub line_width: f64,
    pub lighting: bool,
}

impl Property {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLProperty".into(),
            representation: Some(Representation::Surface),
            color: Some([1.0, 1.0, 1.0]),
            diffuse_color: Some([1.0, 1.0, 1.0]),
            ambient_color: [1.0, 1.0, 1.0],
            specular_color: [1.0, 1.0, 1.0],
            edge_color: [0.0, 0.0, 0.0],
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            specular_power: 1.0,
            opacity: 1.0,
            interpolation: 1,
            edge_visibility: false,
            backface_culling: false,
            frontface_culling: false,
            point_size: 1.0,
            line_width: 1.0,
            lighting: true,
        }
    }
}

impl Default for Property {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderable prop: geometry through a mapper, appearance through a property.
#[derive(Clone, Debug)]
pub struct Actor {
    id: Identity,
    pub class_name: String,
    pub visibility: bool,
    pub pickable: bool,
    pub dragable: bool,
    pub use_bounds: bool,
    pub origin: [f64; 3],
    pub scale: [f64; 3],
    /// Full model matrix.
    pub matrix: DMat4,
    pub force_opaque: bool,
    pub force_translucent: bool,
    pub mapper: Option<Mapper>,
    pub property: Option<Property>,
    pub texture: Option<Texture>,
}

impl Actor {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLActor".into(),
            visibility: true,
            pickable: true,
            dragable: true,
            use_bounds: true,
            origin: [0.0; 3],
            scale: [1.0; 3],
            matrix: DMat4::IDENTITY,
            force_opaque: false,
            force_translucent: false,
            mapper: None,
            property: None,
            texture: None,
        }
    }

    pub fn with_mapper(mut self, mapper: Mapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.property = Some(property);
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

/// Scene object known only by class name and identity.
///
/// Stands in for prop kinds this crate does not model (text actors,
/// widgets, volumes); they resolve to no serializer and are skipped.
#[derive(Clone, Debug)]
pub struct OpaqueObject {
    id: Identity,
    pub class_name: String,
}

impl OpaqueObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { id: Identity::new(), class_name: class_name.into() }
    }
}

/// Member of a renderer's view-prop collection.
#[derive(Clone, Debug)]
pub enum ViewProp {
    Actor(Actor),
    Other(OpaqueObject),
}

impl ViewProp {
    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Self::Actor(a) => a.as_node(),
            Self::Other(o) => o.as_node(),
        }
    }
}

impl From<Actor> for ViewProp {
    fn from(a: Actor) -> Self {
        Self::Actor(a)
    }
}

impl From<OpaqueObject> for ViewProp {
    fn from(o: OpaqueObject) -> Self {
        Self::Other(o)
    }
}

impl_scene_object!(
    LookupTable => LookupTable,
    ColorTransferFunction => ColorTransferFunction,
    Mapper => Mapper,
    Texture => Texture,
    Property => Property,
    Actor => Actor,
    OpaqueObject => Opaque,
);
