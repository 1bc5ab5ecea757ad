//! Render window, renderers, cameras and lights.

use super::{next_mtime, Identity, ObjectId, SceneObject, ViewProp};

/// Symbolic light kind understood by the receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LightType {
    HeadLight,
    CameraLight,
    #[default]
    SceneLight,
}

impl LightType {
    /// Map the integer light-type enumeration (1, 2, 3).
    /// Unrecognized values fall back to [`LightType::SceneLight`].
    pub const fn from_vtk(value: i32) -> Self {
        match value {
            1 => Self::HeadLight,
            2 => Self::CameraLight,
            _ => Self::SceneLight,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HeadLight => "HeadLight",
            Self::CameraLight => "CameraLight",
            Self::SceneLight => "SceneLight",
        }
    }
}

/// Camera.
#[derive(Clone, Debug)]
pub struct Camera {
    id: Identity,
    pub class_name: String,
    pub focal_point: [f64; 3],
    pub position: [f64; 3],
    pub view_up: [f64; 3],
    pub clipping_range: [f64; 2],
}

impl Camera {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLCamera".into(),
            focal_point: [0.0, 0.0, 0.0],
            position: [0.0, 0.0, 1.0],
            view_up: [0.0, 1.0, 0.0],
            clipping_range: [0.01, 1000.01],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Light source.
#[derive(Clone, Debug)]
pub struct Light {
    id: Identity,
    pub class_name: String,
    pub switch: bool,
    pub intensity: f64,
    pub diffuse_color: [f64; 3],
    pub position: [f64; 3],
    pub focal_point: [f64; 3],
    pub positional: bool,
    pub exponent: f64,
    pub cone_angle: f64,
    pub attenuation_values: [f64; 3],
    /// Raw integer light type as exposed by the scene library.
    pub light_type: i32,
    pub shadow_attenuation: f64,
}

impl Light {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLLight".into(),
            switch: true,
            intensity: 1.0,
            diffuse_color: [1.0, 1.0, 1.0],
            position: [0.0, 0.0, 1.0],
            focal_point: [0.0, 0.0, 0.0],
            positional: false,
            exponent: 1.0,
            cone_angle: 30.0,
            attenuation_values: [1.0, 0.0, 0.0],
            light_type: 3,
            shadow_attenuation: 1.0,
        }
    }

    pub fn kind(&self) -> LightType {
        LightType::from_vtk(self.light_type)
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new()
    }
}

/// Viewport-sized drawing of a set of props.
#[derive(Clone, Debug)]
pub struct Renderer {
    id: Identity,
    pub class_name: String,
    pub active_camera: Option<Camera>,
    pub view_props: Vec<ViewProp>,
    pub lights: Vec<Light>,
    pub background: [f64; 3],
    pub background2: [f64; 3],
    pub viewport: [f64; 4],
    pub two_sided_lighting: bool,
    pub light_follow_camera: bool,
    pub layer: i32,
    pub preserve_color_buffer: bool,
    pub preserve_depth_buffer: bool,
    pub near_clipping_plane_tolerance: f64,
    pub clipping_range_expansion: f64,
    pub use_shadows: bool,
    pub use_depth_peeling: bool,
    pub occlusion_ratio: f64,
    pub maximum_number_of_peels: i32,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLRenderer".into(),
            active_camera: None,
            view_props: Vec::new(),
            lights: Vec::new(),
            background: [0.0, 0.0, 0.0],
            background2: [0.2, 0.2, 0.2],
            viewport: [0.0, 0.0, 1.0, 1.0],
            two_sided_lighting: true,
            light_follow_camera: true,
            layer: 0,
            preserve_color_buffer: false,
            preserve_depth_buffer: false,
            near_clipping_plane_tolerance: 0.0,
            clipping_range_expansion: 0.5,
            use_shadows: false,
            use_depth_peeling: false,
            occlusion_ratio: 0.0,
            maximum_number_of_peels: 4,
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.active_camera = Some(camera);
        self
    }

    pub fn add_view_prop(&mut self, prop: impl Into<ViewProp>) {
        self.view_props.push(prop.into());
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of a scene: an ordered set of renderers.
///
/// Every change to the renderer set goes through methods that bump the
/// window's modification time.
#[derive(Clone, Debug)]
pub struct RenderWindow {
    id: Identity,
    pub class_name: String,
    renderers: Vec<Renderer>,
    pub number_of_layers: i32,
    mtime: u64,
}

impl RenderWindow {
    pub fn new() -> Self {
        Self {
            id: Identity::new(),
            class_name: "vtkOpenGLRenderWindow".into(),
            renderers: Vec::new(),
            number_of_layers: 1,
            mtime: next_mtime(),
        }
    }

    pub fn add_renderer(&mut self, renderer: Renderer) {
        self.renderers.push(renderer);
        self.modified();
    }

    /// Drop the renderer with the given identity, if present.
    pub fn remove_renderer(&mut self, id: ObjectId) -> Option<Renderer> {
        let index = self.renderers.iter().position(|r| r.object_id() == id)?;
        self.modified();
        Some(self.renderers.remove(index))
    }

    /// Put `renderer` at `index`, returning the one it displaces.
    pub fn replace_renderer(&mut self, index: usize, renderer: Renderer) -> Option<Renderer> {
        let slot = self.renderers.get_mut(index)?;
        let previous = std::mem::replace(slot, renderer);
        self.modified();
        Some(previous)
    }

    pub fn renderers(&self) -> &[Renderer] {
        &self.renderers
    }

    /// Mutable access to the renderers. Counts as a modification.
    pub fn renderers_mut(&mut self) -> &mut [Renderer] {
        self.modified();
        &mut self.renderers
    }

    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    pub fn modified(&mut self) {
        self.mtime = next_mtime();
    }
}

impl Default for RenderWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl_scene_object!(
    Camera => Camera,
    Light => Light,
    Renderer => Renderer,
    RenderWindow => RenderWindow,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;

    #[test]
    fn test_light_type_mapping() {
        assert_eq!(LightType::from_vtk(1).label(), "HeadLight");
        assert_eq!(LightType::from_vtk(2).label(), "CameraLight");
        assert_eq!(LightType::from_vtk(3).label(), "SceneLight");
        assert_eq!(LightType::from_vtk(42), LightType::SceneLight);
        assert_eq!(LightType::from_vtk(0), LightType::SceneLight);
    }

    #[test]
    fn test_window_mtime_moves() {
        let mut window = RenderWindow::new();
        let before = window.mtime();
        let renderer = Renderer::new();
        let rid = renderer.object_id();
        window.add_renderer(renderer);
        assert!(window.mtime() > before);

        let mid = window.mtime();
        assert!(window.remove_renderer(rid).is_some());
        assert!(window.mtime() > mid);
        assert!(window.remove_renderer(rid).is_none());
    }

    #[test]
    fn test_window_mtime_on_replace() {
        let mut window = RenderWindow::new();
        window.add_renderer(Renderer::new());

        let before = window.mtime();
        assert!(window.replace_renderer(0, Renderer::new()).is_some());
        assert!(window.mtime() > before);
        assert!(window.replace_renderer(3, Renderer::new()).is_none());

        let before = window.mtime();
        window.renderers_mut()[0].add_light(Light::new());
        assert!(window.mtime() > before);
        assert_eq!(window.renderers()[0].lights.len(), 1);
    }
}
