use serde_json::json;

use super::{flag, Fragments, SceneSerializer, Visit};
use crate::core::{InstanceDescriptor, SynchronizationContext};
use crate::scene::{NodeRef, SceneObject};
use crate::util::Diagnostic;

/// Actor with its mapper, property and texture.
///
/// A visible actor is only emitted once both its mapper and property
/// serialized. An invisible one is emitted without children.
pub(super) fn serialize_actor(
    serializer: &SceneSerializer,
    ctx: &mut SynchronizationContext,
    visit: &Visit<'_>,
) -> Option<InstanceDescriptor> {
    let NodeRef::Actor(actor) = visit.node else {
        return visit.mismatch(ctx, "actor");
    };

    let mut parts = Fragments::default();
    let mut has_mapper = false;
    let mut has_property = false;

    if actor.visibility {
        match &actor.mapper {
            Some(mapper) => {
                has_mapper = parts.attach(serializer, ctx, visit, mapper.as_node(), mapper.reference_id(), "setMapper");
            }
            None => diagnose!(ctx, visit.depth, Diagnostic::MissingAccessor, "actor {} has no mapper", visit.id),
        }

        match &actor.property {
            Some(property) => {
                has_property =
                    parts.attach(serializer, ctx, visit, property.as_node(), property.reference_id(), "setProperty");
            }
            None => diagnose!(ctx, visit.depth, Diagnostic::MissingAccessor, "actor {} has no property", visit.id),
        }

        if let Some(texture) = &actor.texture {
            parts.attach(serializer, ctx, visit, texture.as_node(), texture.reference_id(), "addTexture");
        }

        if !(has_mapper && has_property) {
            diagnose!(
                ctx,
                visit.depth,
                Diagnostic::IncompleteFragment,
                "actor {} dropped (mapper: {}, property: {})",
                visit.id,
                has_mapper,
                has_property
            );
            return None;
        }
    }

    let properties = json!({
        // prop
        "visibility": flag(actor.visibility),
        "pickable": flag(actor.pickable),
        "dragable": flag(actor.dragable),
        "useBounds": flag(actor.use_bounds),
        // transform
        "origin": actor.origin,
        "scale": actor.scale,
        "rotation": actor.matrix.to_cols_array(),
        "forceOpaque": flag(actor.force_opaque),
        "forceTranslucent": flag(actor.force_translucent),
    });

    Some(parts.finish(InstanceDescriptor::new(visit.parent_id(), &visit.id, "vtkActor", properties)))
}
