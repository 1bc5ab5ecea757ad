//! Lookup tables and color transfer functions.

use serde_json::json;

use super::{flag, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, SynchronizationContext};
use crate::scene::NodeRef;

pub(super) fn serialize_lookup_table(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::LookupTable(table) = visit.node else {
        return visit.mismatch(ctx, "lookup table");
    };

    // Alpha range is not sent: the client renders it incorrectly.
    let properties = json!({
        "numberOfColors": table.number_of_colors,
        "valueRange": table.table_range,
        "hueRange": table.hue_range,
        "saturationRange": table.saturation_range,
        "nanColor": table.nan_color,
        "belowRangeColor": table.below_range_color,
        "aboveRangeColor": table.above_range_color,
        "useAboveRangeColor": flag(table.use_above_range_color),
        "useBelowRangeColor": flag(table.use_below_range_color),
        "alpha": table.alpha,
        "vectorSize": table.vector_size,
        "vectorComponent": table.vector_component,
        "vectorMode": table.vector_mode,
        "indexedLookup": flag(table.indexed_lookup),
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkLookupTable", properties))
}

pub(super) fn serialize_transfer_function(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::ColorTransferFunction(function) = visit.node else {
        return visit.mismatch(ctx, "color transfer function");
    };

    let properties = json!({
        "clamping": flag(function.clamping),
        "colorSpace": function.color_space,
        "hSVWrap": flag(function.hsv_wrap),
        "allowDuplicateScalars": flag(function.allow_duplicate_scalars),
        "alpha": function.alpha,
        "vectorComponent": function.vector_component,
        "vectorSize": function.vector_size,
        "vectorMode": function.vector_mode,
        "indexedLookup": flag(function.indexed_lookup),
        "nodes": function.nodes,
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkColorTransferFunction", properties))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ColorTransferFunction, LookupTable, SceneObject};

    fn run(node: NodeRef<'_>) -> InstanceDescriptor {
        let serializer = SceneSerializer::default();
        let mut ctx = SynchronizationContext::default();
        serializer.serialize_instance(&mut ctx, &Visit::root(node, "c")).unwrap()
    }

    #[test]
    fn test_lookup_table() {
        let mut table = LookupTable::new().with_colors(16);
        table.table_range = [-1.0, 5.0];
        let out = run(table.as_node());
        assert_eq!(out.kind, "vtkLookupTable");
        assert_eq!(out.property("numberOfColors"), Some(&json!(16)));
        assert_eq!(out.property("valueRange"), Some(&json!([-1.0, 5.0])));
        assert_eq!(out.property("indexedLookup"), Some(&json!(0)));
        assert!(out.property("alphaRange").is_none());
    }

    #[test]
    fn test_transfer_function_nodes() {
        let mut function = ColorTransferFunction::new();
        function.add_rgb_point(1.0, 1.0, 0.0, 0.0);
        function.add_rgb_point(0.0, 0.0, 0.0, 1.0);
        let out = run(function.as_node());
        assert_eq!(out.kind, "vtkColorTransferFunction");
        assert_eq!(
            out.property("nodes"),
            Some(&json!([[0.0, 0.0, 0.0, 1.0, 0.5, 0.0], [1.0, 1.0, 0.0, 0.0, 0.5, 0.0]]))
        );
        assert_eq!(out.property("hSVWrap"), Some(&json!(1)));
    }
}
