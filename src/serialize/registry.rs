//! Class name to serializer dispatch table.

use std::collections::HashMap;
use std::fmt;

use super::{actor, color, dataset, mapper, property, render, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, SynchronizationContext};

/// Serializer of one node kind.
///
/// Receives the serializer for recursing into children. Returns `None`
/// when the node cannot be represented in this snapshot.
pub type SerializerFn =
    fn(&SceneSerializer, &mut SynchronizationContext, &Visit<'_>) -> Option<InstanceDescriptor>;

/// Render window classes of the common platform back ends.
const RENDER_WINDOW_CLASSES: [&str; 10] = [
    "vtkCocoaRenderWindow",
    "vtkXOpenGLRenderWindow",
    "vtkWin32OpenGLRenderWindow",
    "vtkEGLRenderWindow",
    "vtkOpenVRRenderWindow",
    "vtkGenericOpenGLRenderWindow",
    "vtkOSOpenGLRenderWindow",
    "vtkOpenGLRenderWindow",
    "vtkIOSRenderWindow",
    "vtkExternalOpenGLRenderWindow",
];

/// Map of class name to [`SerializerFn`].
///
/// Built once and handed to a [`SceneSerializer`]; registrations become
/// visible to every serialization made through it.
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    serializers: HashMap<String, SerializerFn>,
}

impl InstanceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in serializer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Actors
        registry.register("vtkOpenGLActor", actor::serialize_actor);
        registry.register("vtkPVLODActor", actor::serialize_actor);

        // Mappers
        registry.register("vtkOpenGLPolyDataMapper", mapper::serialize_mapper);
        registry.register("vtkCompositePolyDataMapper2", mapper::serialize_mapper);
        registry.register("vtkDataSetMapper", mapper::serialize_mapper);

        registry.register("vtkOpenGLTexture", mapper::serialize_texture);

        // Color maps
        registry.register("vtkLookupTable", color::serialize_lookup_table);
        registry.register("vtkPVDiscretizableColorTransferFunction", color::serialize_transfer_function);
        registry.register("vtkColorTransferFunction", color::serialize_transfer_function);

        registry.register("vtkOpenGLProperty", property::serialize_property);

        // Datasets
        registry.register("vtkPolyData", dataset::serialize_polydata);
        registry.register("vtkImageData", dataset::serialize_imagedata);
        registry.register("vtkMultiBlockDataSet", dataset::serialize_merged);
        registry.register("vtkUnstructuredGrid", dataset::serialize_merged);

        for class_name in RENDER_WINDOW_CLASSES {
            registry.register(class_name, render::serialize_render_window);
        }
        registry.register("vtkOpenGLRenderer", render::serialize_renderer);
        registry.register("vtkOpenGLCamera", render::serialize_camera);
        registry.register("vtkPVLight", render::serialize_light);
        registry.register("vtkOpenGLLight", render::serialize_light);

        registry
    }

    /// Register `serializer` for `class_name`, returning any it replaced.
    pub fn register(&mut self, class_name: impl Into<String>, serializer: SerializerFn) -> Option<SerializerFn> {
        self.serializers.insert(class_name.into(), serializer)
    }

    pub fn unregister(&mut self, class_name: &str) -> Option<SerializerFn> {
        self.serializers.remove(class_name)
    }

    pub fn resolve(&self, class_name: &str) -> Option<SerializerFn> {
        self.serializers.get(class_name).copied()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.serializers.contains_key(class_name)
    }

    /// Registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.serializers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}
