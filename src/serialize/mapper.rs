//! Mappers and textures - nodes that own an input dataset.

use serde_json::json;

use super::{flag, Fragments, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, SynchronizationContext};
use crate::scene::NodeRef;
use crate::util::Diagnostic;

/// Mapper with its input dataset and lookup table; both are required.
pub(super) fn serialize_mapper(
    serializer: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Mapper(mapper) = visit.node else {
        return visit.mismatch(ctx, "mapper");
    };

    let mut parts = Fragments::default();

    let has_input = match &mapper.input {
        Some(input) => {
            let id = format!("{}-dataset", visit.id);
            parts.attach(serializer, ctx, visit, input.as_node(), id, "setInputData")
        }
        None => {
            diagnose!(ctx, visit.depth, Diagnostic::MissingAccessor, "mapper {} has no input", visit.id);
            false
        }
    };

    let has_table = match &mapper.lookup_table {
        Some(table) => {
            let node = table.as_node();
            parts.attach(serializer, ctx, visit, node, node.object_id().to_string(), "setLookupTable")
        }
        None => {
            diagnose!(ctx, visit.depth, Diagnostic::MissingAccessor, "mapper {} has no lookup table", visit.id);
            false
        }
    };

    if !(has_input && has_table) {
        diagnose!(
            ctx,
            visit.depth,
            Diagnostic::IncompleteFragment,
            "mapper {} dropped (input: {}, lookup table: {})",
            visit.id,
            has_input,
            has_table
        );
        return None;
    }

    let properties = json!({
        "resolveCoincidentTopology": mapper.resolve_coincident_topology,
        "renderTime": mapper.render_time,
        "arrayAccessMode": mapper.array_access_mode,
        "scalarRange": mapper.scalar_range,
        "useLookupTableScalarRange": flag(mapper.use_lookup_table_scalar_range),
        "scalarVisibility": flag(mapper.scalar_visibility),
        "colorByArrayName": mapper.array_name,
        "colorMode": mapper.color_mode,
        "scalarMode": mapper.scalar_mode as i32,
        "interpolateScalarsBeforeMapping": flag(mapper.interpolate_scalars_before_mapping),
    });

    Some(parts.finish(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkMapper", properties)))
}

/// Texture with its input image, which is required.
pub(super) fn serialize_texture(
    serializer: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Texture(texture) = visit.node else {
        return visit.mismatch(ctx, "texture");
    };

    let mut parts = Fragments::default();
    let has_input = match &texture.input {
        Some(input) => {
            let id = format!("{}-texture", visit.id);
            parts.attach(serializer, ctx, visit, input.as_node(), id, "setInputData")
        }
        None => false,
    };

    if !has_input {
        diagnose!(ctx, visit.depth, Diagnostic::IncompleteFragment, "texture {} has no usable input", visit.id);
        return None;
    }

    let properties = json!({
        "interpolate": flag(texture.interpolate),
        "repeat": flag(texture.repeat),
        "edgeClamp": flag(texture.edge_clamp),
    });

    Some(parts.finish(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkTexture", properties)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{unwrap_id, SyncOptions};
    use crate::scene::{DataArray, ImageData, LookupTable, Mapper, PolyData, SceneObject, Texture};

    fn run(node: NodeRef<'_>, id: String) -> Option<InstanceDescriptor> {
        let serializer = SceneSerializer::default();
        let mut ctx = SynchronizationContext::new(SyncOptions { debug: true, ..Default::default() });
        serializer.serialize_instance(&mut ctx, &Visit::root(node, id))
    }

    fn points() -> PolyData {
        PolyData::new().with_points(DataArray::shared("Points", 3, vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]))
    }

    #[test]
    fn test_mapper_needs_input_and_table() {
        let mapper = Mapper::new().with_input(points()).with_lookup_table(LookupTable::new().with_colors(2));
        let out = run(mapper.as_node(), mapper.reference_id()).unwrap();
        assert_eq!(out.dependencies.len(), 2);

        let dataset_id = format!("{}-dataset", mapper.reference_id());
        assert_eq!(out.dependencies[0].id, dataset_id);
        assert_eq!(out.calls[0].instance_arg(), Some(dataset_id.as_str()));
        assert_eq!(out.calls[1].method, "setLookupTable");
        assert_eq!(out.dependencies[1].kind, "vtkLookupTable");
        assert!(unwrap_id(out.calls[1].args[0].as_str().unwrap()).is_some());
    }

    #[test]
    fn test_mapper_without_table_is_dropped() {
        let mapper = Mapper::new().with_input(points());
        assert!(run(mapper.as_node(), mapper.reference_id()).is_none());
    }

    #[test]
    fn test_mapper_without_points_is_dropped() {
        let mapper = Mapper::new().with_input(PolyData::new()).with_lookup_table(LookupTable::new());
        assert!(run(mapper.as_node(), mapper.reference_id()).is_none());
    }

    #[test]
    fn test_texture() {
        let mut image = ImageData::new([2, 2, 1]);
        image.point_data.set_scalars(DataArray::shared("rgb", 3, vec![255u8; 12]));
        let texture = Texture::new().with_input(image);
        let out = run(texture.as_node(), texture.reference_id()).unwrap();
        assert_eq!(out.kind, "vtkTexture");
        assert_eq!(out.dependencies[0].id, format!("{}-texture", texture.reference_id()));
        assert_eq!(out.property("repeat"), Some(&json!(1)));

        assert!(run(Texture::new().as_node(), "t".into()).is_none());
    }
}
