//! Array metadata and the attribute fields a mapper needs.

use std::sync::Arc;

use crate::core::{ArrayDescriptor, FieldLocation, RangeInfo, Registration, SynchronizationContext};
use crate::scene::{DataArray, DataSetAttributes, Mapper, PolyData, ScalarMode};

/// Describe an array and register it for fetching.
///
/// Ranges list every component followed by the magnitude for
/// multi-component arrays, or component 0 alone otherwise. Empty arrays
/// have no content hash and yield `None`.
pub fn describe_array(ctx: &mut SynchronizationContext, array: &Arc<DataArray>) -> Option<ArrayDescriptor> {
    let hash = match ctx.cache_array(array) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::trace!(array = array.name().unwrap_or(""), %err, "array not described");
            return None;
        }
    };

    let components = array.components();
    let ranges = if components > 1 {
        let mut ranges: Vec<RangeInfo> = (0..components)
            .map(|c| {
                let (min, max) = array.range(c);
                RangeInfo { min, max, component: array.component_name(c).map(str::to_string) }
            })
            .collect();
        let (min, max) = array.magnitude_range();
        ranges.push(RangeInfo { min, max, component: None });
        ranges
    } else {
        let (min, max) = array.range(0);
        vec![RangeInfo { min, max, component: array.component_name(0).map(str::to_string) }]
    };

    Some(ArrayDescriptor {
        hash,
        vtk_class: "vtkDataArray".to_string(),
        name: array.name().map(str::to_string),
        data_type: array.scalar_type().wire_tag().to_string(),
        number_of_components: components,
        size: array.num_values(),
        ranges,
        location: None,
        registration: None,
    })
}

/// Scalars colored by `mapper`, as (location, array).
fn color_array<'a>(mapper: &Mapper, poly: &'a PolyData) -> Option<(FieldLocation, &'a Arc<DataArray>)> {
    if !mapper.scalar_visibility {
        return None;
    }

    let named = |attributes: &'a DataSetAttributes| mapper.array_name.as_deref().and_then(|n| attributes.array(n));
    let by_name_or_active =
        |attributes: &'a DataSetAttributes| named(attributes).or_else(|| attributes.scalars());

    match mapper.scalar_mode {
        ScalarMode::Default => poly
            .point_data
            .scalars()
            .map(|a| (FieldLocation::PointData, a))
            .or_else(|| poly.cell_data.scalars().map(|a| (FieldLocation::CellData, a))),
        ScalarMode::UsePointData => by_name_or_active(&poly.point_data).map(|a| (FieldLocation::PointData, a)),
        ScalarMode::UseCellData => by_name_or_active(&poly.cell_data).map(|a| (FieldLocation::CellData, a)),
        ScalarMode::UsePointFieldData => named(&poly.point_data).map(|a| (FieldLocation::PointData, a)),
        ScalarMode::UseCellFieldData => named(&poly.cell_data).map(|a| (FieldLocation::CellData, a)),
        ScalarMode::UseFieldData => None,
    }
}

/// Field arrays of `poly`: the scalars `mapper` colors by (if any), then
/// point normals, then point texture coordinates.
pub fn extract_fields(
    ctx: &mut SynchronizationContext,
    mapper: Option<&Mapper>,
    poly: &PolyData,
) -> Vec<ArrayDescriptor> {
    let mut fields = Vec::new();

    if let Some((location, array)) = mapper.and_then(|m| color_array(m, poly)) {
        if let Some(desc) = describe_array(ctx, array) {
            fields.push(desc.at(location, Registration::SetScalars));
        }
    }

    if let Some(desc) = poly.point_data.normals().and_then(|a| describe_array(ctx, a)) {
        fields.push(desc.at(FieldLocation::PointData, Registration::SetNormals));
    }

    if let Some(desc) = poly.point_data.tcoords().and_then(|a| describe_array(ctx, a)) {
        fields.push(desc.at(FieldLocation::PointData, Registration::SetTCoords));
    }

    fields
}
