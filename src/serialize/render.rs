//! Render window, renderer, camera and light.

use serde_json::json;

use super::{flag, Fragments, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, Relation, RelationKey, SynchronizationContext};
use crate::scene::{NodeRef, SceneObject, ROOT_PARENT};
use crate::util::Diagnostic;

/// Root of the tree. Always emitted, even without renderers.
pub(super) fn serialize_render_window(
    serializer: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::RenderWindow(window) = visit.node else {
        return visit.mismatch(ctx, "render window");
    };

    let mut parts = Fragments::default();
    let renderer_ids: Vec<String> = window
        .renderers()
        .iter()
        .filter_map(|r| parts.collect(serializer, ctx, visit, r.as_node(), r.reference_id()))
        .collect();

    let ignore = ctx.options().ignore_last_dependencies;
    let key = RelationKey::new(visit.id.clone(), Relation::Renderers);
    parts.calls = ctx.dependencies_mut().calls_for(key, renderer_ids, ignore);

    let properties = json!({ "numberOfLayers": window.number_of_layers });
    let descriptor = InstanceDescriptor::new(ROOT_PARENT, &visit.id, &window.class_name, properties)
        .with_mtime(window.mtime());
    Some(parts.finish(descriptor))
}

/// Renderer with its camera, view props and lights.
///
/// Emitted only when more than one child serialized; a renderer holding
/// nothing but a camera has nothing to draw.
pub(super) fn serialize_renderer(
    serializer: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Renderer(renderer) = visit.node else {
        return visit.mismatch(ctx, "renderer");
    };

    let mut parts = Fragments::default();

    match &renderer.active_camera {
        Some(camera) => {
            parts.attach(serializer, ctx, visit, camera.as_node(), camera.reference_id(), "setActiveCamera");
        }
        None => diagnose!(ctx, visit.depth, Diagnostic::MissingAccessor, "renderer {} has no active camera", visit.id),
    }

    let prop_ids: Vec<String> = renderer
        .view_props
        .iter()
        .filter_map(|p| {
            let node = p.as_node();
            parts.collect(serializer, ctx, visit, node, node.object_id().to_string())
        })
        .collect();

    let light_ids: Vec<String> = renderer
        .lights
        .iter()
        .filter_map(|l| parts.collect(serializer, ctx, visit, l.as_node(), l.reference_id()))
        .collect();

    let ignore = ctx.options().ignore_last_dependencies;
    let differ = ctx.dependencies_mut();
    let prop_calls = differ.calls_for(RelationKey::new(visit.id.clone(), Relation::ViewProps), prop_ids, ignore);
    let light_calls = differ.calls_for(RelationKey::new(visit.id.clone(), Relation::Lights), light_ids, ignore);
    parts.calls.extend(prop_calls);
    parts.calls.extend(light_calls);

    if parts.dependencies.len() <= 1 {
        diagnose!(
            ctx,
            visit.depth,
            Diagnostic::IncompleteFragment,
            "renderer {} dropped ({} children)",
            visit.id,
            parts.dependencies.len()
        );
        return None;
    }

    let properties = json!({
        "background": renderer.background,
        "background2": renderer.background2,
        "viewport": renderer.viewport,
        "twoSidedLighting": flag(renderer.two_sided_lighting),
        "lightFollowCamera": flag(renderer.light_follow_camera),
        "layer": renderer.layer,
        "preserveColorBuffer": flag(renderer.preserve_color_buffer),
        "preserveDepthBuffer": flag(renderer.preserve_depth_buffer),
        "nearClippingPlaneTolerance": renderer.near_clipping_plane_tolerance,
        "clippingRangeExpansion": renderer.clipping_range_expansion,
        "useShadows": flag(renderer.use_shadows),
        "useDepthPeeling": flag(renderer.use_depth_peeling),
        "occlusionRatio": renderer.occlusion_ratio,
        "maximumNumberOfPeels": renderer.maximum_number_of_peels,
    });

    Some(parts.finish(InstanceDescriptor::new(visit.parent_id(), &visit.id, &renderer.class_name, properties)))
}

pub(super) fn serialize_camera(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Camera(camera) = visit.node else {
        return visit.mismatch(ctx, "camera");
    };

    let properties = json!({
        "focalPoint": camera.focal_point,
        "position": camera.position,
        "viewUp": camera.view_up,
        "clippingRange": camera.clipping_range,
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkCamera", properties))
}

pub(super) fn serialize_light(
    _: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Light(light) = visit.node else {
        return visit.mismatch(ctx, "light");
    };

    let properties = json!({
        "switch": flag(light.switch),
        "intensity": light.intensity,
        "color": light.diffuse_color,
        "position": light.position,
        "focalPoint": light.focal_point,
        "positional": flag(light.positional),
        "exponent": light.exponent,
        "coneAngle": light.cone_angle,
        "attenuationValues": light.attenuation_values,
        "lightType": light.kind().label(),
        "shadowAttenuation": light.shadow_attenuation,
    });

    Some(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkLight", properties))
}
