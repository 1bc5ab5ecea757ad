//! scenesync CLI - Inspect scene snapshots produced by the serializer.

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use scenesync::core::{ArrayEncoding, InstanceDescriptor};
use scenesync::prelude::*;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "SCENESYNC_LOG";

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("scenesync");

    // Parse global flags
    let mut level = "info";
    let mut config: Option<&str> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            "-c" | "--config" => match iter.next() {
                Some(path) => config = Some(path.as_str()),
                None => bail!("--config requires a file argument"),
            },
            _ => filtered_args.push(arg),
        }
    }

    init_logging(level);

    let mut options = match config {
        Some(path) => SyncOptions::load(path).with_context(|| format!("Failed to load options from {}", path))?,
        None => SyncOptions::default(),
    };
    if matches!(level, "debug" | "trace") {
        options.debug = true;
    }
    debug!(?options, "options");

    match filtered_args.first().copied() {
        Some("scene") | Some("s") => cmd_scene(options),
        Some("arrays") | Some("a") => cmd_arrays(options),
        Some("diff") | Some("d") => cmd_diff(options),
        Some("help") | Some("h") | Some("-h") | Some("--help") | None => {
            print_usage(prog);
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_usage(prog);
            std::process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    println!("scenesync CLI - Inspect scene synchronization snapshots");
    println!();
    println!("Usage: {} [options] <command>", prog);
    println!();
    println!("Commands:");
    println!("  s, scene    Print the instance tree of the demo scene");
    println!("  a, arrays   List cached arrays and their payload sizes");
    println!("  d, diff     Serialize, change the scene, serialize again");
    println!("  h, help     Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose          Debug output (enables traversal diagnostics)");
    println!("  -vv, --trace           Trace output (very verbose)");
    println!("  -q, --quiet            Errors only");
    println!("  -c, --config <file>    Load options from a JSON file");
    println!();
    println!("The {} environment variable overrides the log filter.", LOG_ENV);
}

fn snapshot(serializer: &SceneSerializer, window: &RenderWindow, ctx: &mut SynchronizationContext) -> anyhow::Result<InstanceDescriptor> {
    serializer
        .serialize(window, ctx)
        .context("render window produced no snapshot")
}

fn cmd_scene(options: SyncOptions) -> anyhow::Result<()> {
    let window = demo_scene();
    let serializer = SceneSerializer::default();
    let mut ctx = SynchronizationContext::new(options);

    let tree = snapshot(&serializer, &window, &mut ctx)?;
    info!(instances = tree.iter().count(), arrays = ctx.array_cache().len(), "serialized demo scene");
    println!("{}", tree.to_json_pretty()?);
    Ok(())
}

fn cmd_arrays(options: SyncOptions) -> anyhow::Result<()> {
    let window = demo_scene();
    let serializer = SceneSerializer::default();
    let mut ctx = SynchronizationContext::new(options);
    let tree = snapshot(&serializer, &window, &mut ctx)?;

    println!("{:<40} {:>8} {:>8} {:>8} {:>8}", "hash", "raw", "base64", "zip", "zip+b64");
    for hash in tree.array_hashes() {
        let sizes = [
            ArrayEncoding::new(true, false),
            ArrayEncoding::new(false, false),
            ArrayEncoding::new(true, true),
            ArrayEncoding::new(false, true),
        ]
        .map(|encoding| ctx.fetch_array_with(&hash, encoding).map(|p| p.len()));

        let [raw, text, zipped, zipped_text] = sizes;
        println!("{:<40} {:>8} {:>8} {:>8} {:>8}", hash, raw?, text?, zipped?, zipped_text?);
    }
    println!();
    println!("Cached arrays: {}", ctx.array_cache().len());
    println!("Stale reads:   {}", ctx.array_cache().stale_reads());
    Ok(())
}

fn cmd_diff(options: SyncOptions) -> anyhow::Result<()> {
    let mut window = demo_scene();
    let serializer = SceneSerializer::default();
    let mut ctx = SynchronizationContext::new(options);

    let first = snapshot(&serializer, &window, &mut ctx)?;
    println!("First snapshot:");
    print_calls(&first);

    // Swap the first prop for a fresh one and add a light.
    let renderer = window
        .renderers_mut()
        .first_mut()
        .context("demo scene has no renderer")?;
    if !renderer.view_props.is_empty() {
        renderer.view_props.remove(0);
    }
    renderer.add_view_prop(triangle_actor([0.2, 0.4, 1.0]));
    let mut light = Light::new();
    light.light_type = 1;
    renderer.add_light(light);

    let second = snapshot(&serializer, &window, &mut ctx)?;
    println!();
    println!("Second snapshot:");
    print_calls(&second);

    let evicted = ctx.sweep();
    println!();
    println!("Swept {} arrays, {} still cached", evicted, ctx.array_cache().len());
    Ok(())
}

fn print_calls(tree: &InstanceDescriptor) {
    for node in tree.iter().filter(|n| !n.calls.is_empty()) {
        println!("  {} {}", node.kind, node.id);
        for call in &node.calls {
            println!("    {}({})", call.method, call.instance_arg().unwrap_or("?"));
        }
    }
}

// ============================================================================
// Demo scene
// ============================================================================

fn triangle_actor(color: [f64; 3]) -> Actor {
    let points = DataArray::shared("Points", 3, vec![0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let mut poly = PolyData::new().with_points(points).with_polys(cell_array(&[&[0, 1, 2]]));
    poly.point_data.set_scalars(DataArray::shared("height", 1, vec![0.0f32, 0.5, 1.0]));
    poly.point_data.set_normals(DataArray::shared("Normals", 3, vec![0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]));

    let mut property = Property::new();
    property.diffuse_color = Some(color);
    Actor::new()
        .with_mapper(Mapper::new().with_input(poly).with_lookup_table(LookupTable::new()))
        .with_property(property)
}

fn tetra_actor(points: Arc<DataArray>) -> Actor {
    let mut grid = UnstructuredGrid::new();
    grid.points = Some(points);
    grid.cells.push(Cell::new(CellType::Tetra, vec![0, 1, 2, 3]));

    let mut function = ColorTransferFunction::new();
    function.add_rgb_point(0.0, 0.0, 0.0, 1.0);
    function.add_rgb_point(1.0, 1.0, 0.0, 0.0);

    let mut property = Property::new();
    property.representation = Some(Representation::Wireframe);
    property.color = Some([1.0, 0.8, 0.0]);
    Actor::new()
        .with_mapper(Mapper::new().with_input(grid).with_lookup_table(function))
        .with_property(property)
}

fn demo_scene() -> RenderWindow {
    let tetra_points = DataArray::shared(
        "Points",
        3,
        vec![2.0f32, 0.0, 0.0, 3.0, 0.0, 0.0, 2.0, 1.0, 0.0, 2.0, 0.0, 1.0],
    );

    let mut renderer = Renderer::new().with_camera(Camera::new());
    renderer.add_view_prop(triangle_actor([1.0, 1.0, 1.0]));
    renderer.add_view_prop(tetra_actor(tetra_points));
    renderer.add_view_prop(OpaqueObject::new("vtkScalarBarActor"));
    renderer.add_light(Light::new());

    let mut window = RenderWindow::new();
    window.add_renderer(renderer);
    window
}
