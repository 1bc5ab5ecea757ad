use serde_json::json;

use super::{flag, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, SynchronizationContext};
use crate::scene::{NodeRef, Representation};

const WHITE: [f64; 3] = [1.0, 1.0, 1.0];

/// Surface appearance. In wireframe mode the client colors lines with the
/// diffuse color, so `diffuseColor` carries the plain color instead.
pub(super) fn serialize_property(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Property(property) = visit.node else {
        return visit.mismatch(ctx, "property");
    };

    let representation = property.representation.unwrap_or_default();
    let mut diffuse_color = property.diffuse_color.unwrap_or(WHITE);
    if representation == Representation::Wireframe {
        if let Some(color) = property.color {
            diffuse_color = color;
        }
    }

    let properties = json!({
        "representation": representation as i32,
        "diffuseColor": diffuse_color,
        "color": property.color.unwrap_or(diffuse_color),
        "ambientColor": property.ambient_color,
        "specularColor": property.specular_color,
        "edgeColor": property.edge_color,
        "ambient": property.ambient,
        "diffuse": property.diffuse,
        "specular": property.specular,
        "specularPower": property.specular_power,
        "opacity": property.opacity,
        "interpolation": property.interpolation,
        "edgeVisibility": flag(property.edge_visibility),
        "backfaceCulling": flag(property.backface_culling),
        "frontfaceCulling": flag(property.frontface_culling),
        "pointSize": property.point_size,
        "lineWidth": property.line_width,
        "lighting": flag(property.lighting),
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkProperty", properties))
}
