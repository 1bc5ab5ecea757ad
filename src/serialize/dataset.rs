//! Datasets: polygonal, image, and everything converted to polygons.

use std::borrow::Cow;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::fields::{describe_array, extract_fields};
use super::{SceneSerializer, Visit};
use crate::core::{FieldLocation, InstanceDescriptor, Registration, SynchronizationContext};
use crate::scene::geometry::{extract_surface, merge_blocks, to_polydata};
use crate::scene::{DataArray, NodeRef, PolyData};
use crate::util::Diagnostic;

pub(super) fn serialize_polydata(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::PolyData(poly) = visit.node else {
        return visit.mismatch(ctx, "polydata");
    };
    describe_polydata(ctx, visit, poly)
}

/// Unstructured grids and composites, flattened to one polydata.
pub(super) fn serialize_merged(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let poly: Cow<'_, PolyData> = match visit.node {
        NodeRef::UnstructuredGrid(grid) => Cow::Owned(extract_surface(grid)),
        NodeRef::MultiBlock(composite) => match composite.blocks.as_slice() {
            [single] => match to_polydata(single) {
                Some(poly) => poly,
                None => {
                    diagnose!(ctx, visit.depth, Diagnostic::MissingPoints, "block of {} has no polygonal form", visit.id);
                    return None;
                }
            },
            _ => Cow::Owned(merge_blocks(composite)),
        },
        _ => return visit.mismatch(ctx, "composite or unstructured data"),
    };
    describe_polydata(ctx, visit, &poly)
}

pub(super) fn serialize_imagedata(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::ImageData(image) = visit.node else {
        return visit.mismatch(ctx, "image data");
    };

    let Some(scalars) = image.point_data.scalars().and_then(|a| describe_array(ctx, a)) else {
        diagnose!(ctx, visit.depth, Diagnostic::MissingScalars, "image {} has no point scalars", visit.id);
        return None;
    };
    let scalars = scalars.at(FieldLocation::PointData, Registration::SetScalars);

    // Row-major 3x3.
    let direction = image.direction.transpose().to_cols_array();

    let properties = json!({
        "spacing": image.spacing,
        "origin": image.origin,
        "dimensions": image.dimensions,
        "direction": direction,
        "fields": [scalars.to_value()],
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, &image.class_name, properties))
}

/// Descriptor of a polydata, under the id and parent of `visit`.
fn describe_polydata(ctx: &mut SynchronizationContext, visit: &Visit<'_>, poly: &PolyData) -> Option<InstanceDescriptor> {
    let Some(points) = poly.points.as_ref().filter(|p| !p.is_empty()) else {
        diagnose!(ctx, visit.depth, Diagnostic::MissingPoints, "This dataset has no points! ({})", visit.id);
        return None;
    };

    let mut properties = Map::new();
    let points = describe_array(ctx, points)?.with_class("vtkPoints");
    properties.insert("points".into(), points.to_value());

    let cells: [(&str, &Option<Arc<DataArray>>); 4] =
        [("verts", &poly.verts), ("lines", &poly.lines), ("polys", &poly.polys), ("strips", &poly.strips)];
    for (key, cells) in cells {
        let Some(cells) = cells.as_ref().filter(|c| c.num_tuples() > 0) else {
            continue;
        };
        if let Some(desc) = describe_array(ctx, cells) {
            properties.insert(key.into(), desc.with_class("vtkCellArray").to_value());
        }
    }

    let mapper = match visit.parent {
        Some(NodeRef::Mapper(mapper)) => Some(mapper),
        _ => None,
    };
    let fields: Vec<Value> = extract_fields(ctx, mapper, poly).iter().map(|f| f.to_value()).collect();
    properties.insert("fields".into(), Value::Array(fields));

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, &poly.class_name, Value::Object(properties)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SyncOptions;
    use crate::scene::{
        cell_array, Cell, CellType, DataObject, ImageData, Mapper, MultiBlockDataSet, SceneObject,
        UnstructuredGrid,
    };
    use glam::DMat3;

    fn triangle() -> PolyData {
        PolyData::new()
            .with_points(DataArray::shared("Points", 3, vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]))
            .with_polys(cell_array(&[&[0, 1, 2]]))
    }

    fn run(node: NodeRef<'_>) -> Option<InstanceDescriptor> {
        let serializer = SceneSerializer::default();
        let mut ctx = SynchronizationContext::new(SyncOptions { debug: true, ..Default::default() });
        serializer.serialize_instance(&mut ctx, &Visit::root(node, "d"))
    }

    #[test]
    fn test_polydata() {
        let poly = triangle();
        let out = run(poly.as_node()).unwrap();
        assert_eq!(out.kind, "vtkPolyData");
        assert_eq!(out.property("points").unwrap()["vtkClass"], "vtkPoints");
        assert_eq!(out.property("polys").unwrap()["vtkClass"], "vtkCellArray");
        assert_eq!(out.property("polys").unwrap()["dataType"], "Uint32Array");
        assert!(out.property("lines").is_none());
        assert_eq!(out.property("fields"), Some(&json!([])));
        assert_eq!(out.array_hashes().len(), 2);
    }

    #[test]
    fn test_polydata_without_points() {
        assert!(run(PolyData::new().as_node()).is_none());
        let empty = PolyData::new().with_points(DataArray::shared("Points", 3, Vec::<f32>::new()));
        assert!(run(empty.as_node()).is_none());
    }

    #[test]
    fn test_fields_follow_parent_mapper() {
        let mut poly = triangle();
        poly.point_data.set_scalars(DataArray::shared("s", 1, vec![1.0f32, 2.0, 3.0]));
        let mapper = Mapper::new();

        let serializer = SceneSerializer::default();
        let mut ctx = SynchronizationContext::default();
        let parent = Visit::root(mapper.as_node(), mapper.reference_id());
        let out = serializer.serialize_instance(&mut ctx, &parent.child(poly.as_node(), "m-dataset")).unwrap();
        assert_eq!(out.parent, mapper.reference_id());
        assert_eq!(out.property("fields").unwrap()[0]["registration"], "setScalars");
    }

    #[test]
    fn test_imagedata() {
        let mut image = ImageData::new([2, 3, 1]);
        image.spacing = [0.5, 0.5, 1.0];
        image.direction = DMat3::from_cols_array(&[0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        image.point_data.set_scalars(DataArray::shared("density", 1, vec![0u16; 6]));

        let out = run(image.as_node()).unwrap();
        assert_eq!(out.property("dimensions"), Some(&json!([2, 3, 1])));
        assert_eq!(
            out.property("direction"),
            Some(&json!([0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]))
        );
        let field = &out.property("fields").unwrap()[0];
        assert_eq!(field["location"], "pointData");
        assert_eq!(field["dataType"], "Uint16Array");
    }

    #[test]
    fn test_imagedata_without_scalars() {
        assert!(run(ImageData::new([1, 1, 1]).as_node()).is_none());
    }

    #[test]
    fn test_unstructured_grid_is_flattened() {
        let mut grid = UnstructuredGrid::new();
        grid.points = Some(DataArray::shared(
            "Points",
            3,
            vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        ));
        grid.cells.push(Cell::new(CellType::Tetra, vec![0, 1, 2, 3]));

        let out = run(grid.as_node()).unwrap();
        assert_eq!(out.kind, "vtkPolyData");
        // Four boundary triangles: 4 x (1 + 3) ids.
        assert_eq!(out.property("polys").unwrap()["size"], 16);
    }

    #[test]
    fn test_single_block_is_unwrapped() {
        let composite = MultiBlockDataSet::new(vec![DataObject::from(triangle())]);
        let out = run(composite.as_node()).unwrap();
        assert_eq!(out.id, "d");
        assert!(out.property("polys").is_some());

        let image_only = MultiBlockDataSet::new(vec![DataObject::from(ImageData::new([1, 1, 1]))]);
        assert!(run(image_only.as_node()).is_none());
    }
}
