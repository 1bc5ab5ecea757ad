//! Integration tests for multi-snapshot synchronization sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scenesync::core::{decode_base64, unzip_payload, ArrayEncoding, ArrayPayload, SyncOptions};
use scenesync::prelude::*;

use tempfile::NamedTempFile;

fn points() -> Arc<DataArray> {
    DataArray::shared("Points", 3, vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
}

fn actor_with(points: Arc<DataArray>) -> Actor {
    let poly = PolyData::new().with_points(points).with_polys(cell_array(&[&[0, 1, 2]]));
    Actor::new()
        .with_mapper(Mapper::new().with_input(poly).with_lookup_table(LookupTable::new()))
        .with_property(Property::new())
}

fn scene(actors: Vec<Actor>) -> RenderWindow {
    let mut renderer = Renderer::new().with_camera(Camera::new());
    for actor in actors {
        renderer.add_view_prop(actor);
    }
    let mut window = RenderWindow::new();
    window.add_renderer(renderer);
    window
}

fn session() -> (SceneSerializer, SynchronizationContext) {
    let options = SyncOptions { debug: true, ..Default::default() };
    (SceneSerializer::default(), SynchronizationContext::new(options))
}

fn methods(node: &InstanceDescriptor) -> Vec<&str> {
    node.calls.iter().map(|c| c.method.as_str()).collect()
}

#[test]
fn test_shared_array_is_cached_once() {
    let (serializer, mut ctx) = session();
    let shared = points();
    let window = scene(vec![actor_with(shared.clone()), actor_with(shared.clone())]);

    let tree = serializer.serialize(&window, &mut ctx).expect("snapshot");
    // One points array and one (content-identical) polys array.
    assert_eq!(tree.array_hashes().len(), 2);
    assert_eq!(ctx.array_cache().len(), 2);

    // Same content in a different object gets the same key.
    let copy = points();
    let window2 = scene(vec![actor_with(copy)]);
    let tree2 = serializer.serialize(&window2, &mut ctx).expect("snapshot");
    assert_eq!(tree.array_hashes(), tree2.array_hashes());
    assert_eq!(ctx.array_cache().len(), 2);
}

#[test]
fn test_hash_changes_with_content() {
    let (serializer, mut ctx) = session();
    let shared = points();
    let window = scene(vec![actor_with(shared.clone())]);

    let before = serializer.serialize(&window, &mut ctx).unwrap().array_hashes();
    let again = serializer.serialize(&window, &mut ctx).unwrap().array_hashes();
    assert_eq!(before, again);

    shared.set_data(vec![0.0f32, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0]);
    let after = serializer.serialize(&window, &mut ctx).unwrap().array_hashes();
    assert_ne!(before, after);
    assert_eq!(ctx.array_cache().len(), 3);
}

#[test]
fn test_ids_are_stable_across_snapshots() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points())]);

    let first = serializer.serialize(&window, &mut ctx).unwrap();
    let second = serializer.serialize(&window, &mut ctx).unwrap();
    let ids = |t: &InstanceDescriptor| t.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.properties, second.properties);
}

#[test]
fn test_unchanged_scene_sends_no_dependency_calls() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points()), actor_with(points())]);

    let first = serializer.serialize(&window, &mut ctx).unwrap();
    assert_eq!(methods(&first), vec!["addRenderer"]);
    let renderer = &first.dependencies[0];
    assert_eq!(methods(renderer), vec!["setActiveCamera", "addViewProp", "addViewProp"]);

    let second = serializer.serialize(&window, &mut ctx).unwrap();
    assert!(second.calls.is_empty());
    assert_eq!(methods(&second.dependencies[0]), vec!["setActiveCamera"]);
}

#[test]
fn test_removed_prop_is_announced_once() {
    let (serializer, mut ctx) = session();
    let mut window = scene(vec![actor_with(points()), actor_with(points())]);
    serializer.serialize(&window, &mut ctx).unwrap();

    let renderer = &mut window.renderers_mut()[0];
    let removed = renderer.view_props.remove(0);
    let removed_id = removed.as_node().object_id().to_string();
    renderer.add_view_prop(actor_with(points()));

    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    let renderer = &tree.dependencies[0];
    assert_eq!(methods(renderer), vec!["setActiveCamera", "addViewProp", "removeViewProp"]);
    assert_eq!(renderer.calls[2].instance_arg(), Some(removed_id.as_str()));

    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    assert_eq!(methods(&tree.dependencies[0]), vec!["setActiveCamera"]);
}

#[test]
fn test_cloned_actor_is_a_separate_instance() {
    let (serializer, mut ctx) = session();
    let original = actor_with(points());
    let mut copy = original.clone();
    if let Some(property) = copy.property.as_mut() {
        property.opacity = 0.25;
    }
    let window = scene(vec![original, copy]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();

    let renderer = &tree.dependencies[0];
    assert_eq!(methods(renderer), vec!["setActiveCamera", "addViewProp", "addViewProp"]);
    let actors: Vec<&InstanceDescriptor> = renderer.dependencies.iter().filter(|n| n.kind == "vtkActor").collect();
    assert_eq!(actors.len(), 2);
    assert_ne!(actors[0].id, actors[1].id);

    // Every id names one descriptor; only the shared lookup table repeats.
    let mut seen: HashMap<&str, &InstanceDescriptor> = HashMap::new();
    for node in tree.iter() {
        match seen.get(node.id.as_str()) {
            Some(first) => {
                assert_eq!(node.kind, "vtkLookupTable");
                assert_eq!(first.properties, node.properties);
            }
            None => {
                seen.insert(node.id.as_str(), node);
            }
        }
    }
    let opacities: Vec<f64> = tree
        .iter()
        .filter(|n| n.kind == "vtkProperty")
        .filter_map(|n| n.property("opacity").and_then(|v| v.as_f64()))
        .collect();
    assert_eq!(opacities, vec![1.0, 0.25]);
}

#[test]
fn test_ignore_last_dependencies() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points())]);
    serializer.serialize(&window, &mut ctx).unwrap();

    ctx.set_ignore_last_dependencies(true);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    assert_eq!(methods(&tree), vec!["addRenderer"]);
    assert_eq!(methods(&tree.dependencies[0]), vec!["setActiveCamera", "addViewProp"]);
}

#[test]
fn test_mapper_with_points_only() {
    let (serializer, mut ctx) = session();
    let bare = Mapper::new().with_input(PolyData::new().with_points(points()));
    let visit = Visit::root(bare.as_node(), bare.reference_id());
    assert!(serializer.serialize_instance(&mut ctx, &visit).is_none());

    let mapper = Mapper::new()
        .with_input(PolyData::new().with_points(points()))
        .with_lookup_table(LookupTable::new().with_colors(2));
    let visit = Visit::root(mapper.as_node(), mapper.reference_id());

    let out = serializer.serialize_instance(&mut ctx, &visit).expect("mapper");
    assert_eq!(out.dependencies.len(), 2);
    assert_eq!(methods(&out), vec!["setInputData", "setLookupTable"]);
}

#[test]
fn test_renderer_with_only_camera_is_dropped() {
    let (serializer, mut ctx) = session();
    let window = scene(Vec::new());
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    assert!(tree.dependencies.is_empty());
    assert!(tree.calls.is_empty());
}

#[test]
fn test_point_metadata() {
    let (serializer, mut ctx) = session();
    let grid = DataArray::shared("Points", 3, vec![0.5f32; 12]);
    let window = scene(vec![actor_with(grid)]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();

    let dataset = tree.iter().find(|n| n.kind == "vtkPolyData").expect("dataset");
    let points = dataset.property("points").unwrap();
    assert_eq!(points["size"], 12);
    assert_eq!(points["numberOfComponents"], 3);
    assert_eq!(points["dataType"], "Float32Array");
    assert_eq!(points["ranges"].as_array().map(Vec::len), Some(4));
    assert!(points["hash"].as_str().unwrap().ends_with("_12f"));
}

#[test]
fn test_fetch_encodings() {
    let (serializer, mut ctx) = session();
    let shared = points();
    let window = scene(vec![actor_with(shared.clone())]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    let dataset = tree.iter().find(|n| n.kind == "vtkPolyData").unwrap();
    let hash = dataset.property("points").unwrap()["hash"].as_str().unwrap().to_string();
    let expected = shared.read().as_bytes().to_vec();

    // Default options: zipped base64 text.
    let text = match ctx.fetch_array(&hash).unwrap() {
        ArrayPayload::Text(text) => text,
        ArrayPayload::Binary(_) => panic!("expected text"),
    };
    let zipped = decode_base64(&text).unwrap();
    assert_eq!(unzip_payload(&zipped, &hash).unwrap(), expected);

    let raw = ctx.fetch_array_with(&hash, ArrayEncoding::new(true, false)).unwrap();
    assert_eq!(raw.as_bytes(), expected.as_slice());

    assert!(matches!(ctx.fetch_array("missing_1f"), Err(Error::ArrayNotCached(_))));
}

#[test]
fn test_cell_connectivity_is_narrowed() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points())]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    let dataset = tree.iter().find(|n| n.kind == "vtkPolyData").unwrap();
    let hash = dataset.property("polys").unwrap()["hash"].as_str().unwrap().to_string();

    let raw = ctx.fetch_array_with(&hash, ArrayEncoding::new(true, false)).unwrap();
    let ids: Vec<u32> = raw
        .as_bytes()
        .chunks_exact(4)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(ids, vec![3, 0, 1, 2]);
}

#[test]
fn test_sweep_evicts_after_scene_is_dropped() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points())]);
    serializer.serialize(&window, &mut ctx).unwrap();
    assert_eq!(ctx.array_cache().len(), 2);

    // Still referenced by the scene.
    assert_eq!(ctx.sweep_with(Duration::ZERO), 0);

    drop(window);
    assert_eq!(ctx.sweep_with(Duration::ZERO), 2);
    assert!(ctx.array_cache().is_empty());
    assert!(ctx.hash_cache().is_empty());
}

#[test]
fn test_stale_read_serves_live_bytes() {
    let (serializer, mut ctx) = session();
    let shared = points();
    let window = scene(vec![actor_with(shared.clone())]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    let dataset = tree.iter().find(|n| n.kind == "vtkPolyData").unwrap();
    let hash = dataset.property("points").unwrap()["hash"].as_str().unwrap().to_string();

    shared.set_data(vec![9.0f32; 9]);
    let raw = ctx.fetch_array_with(&hash, ArrayEncoding::new(true, false)).unwrap();
    assert_eq!(raw.as_bytes(), shared.read().as_bytes());
    assert_eq!(ctx.array_cache().stale_reads(), 1);
}

#[test]
fn test_options_file_roundtrip() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    let options = SyncOptions {
        debug: true,
        binary: true,
        compression: false,
        sweep_max_age_secs: 5.0,
        ..Default::default()
    };
    options.save(temp.path()).expect("save");

    let loaded = SyncOptions::load(temp.path()).expect("load");
    assert_eq!(loaded, options);
    assert_eq!(loaded.sweep_max_age(), Duration::from_secs(5));

    std::fs::write(temp.path(), "{ \"binary\": true }").unwrap();
    let partial = SyncOptions::load(temp.path()).unwrap();
    assert!(partial.binary && partial.compression);
}

#[test]
fn test_wire_json_shape() {
    let (serializer, mut ctx) = session();
    let window = scene(vec![actor_with(points())]);
    let tree = serializer.serialize(&window, &mut ctx).unwrap();
    let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();

    assert_eq!(value["parent"], "0x0");
    assert_eq!(value["type"], "vtkOpenGLRenderWindow");
    let call = &value["calls"][0];
    assert_eq!(call[0], "addRenderer");
    let arg = call[1][0].as_str().unwrap();
    assert!(arg.starts_with("instance:${") && arg.ends_with('}'));
}
