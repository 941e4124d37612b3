//! Entry point for Puck.
//! Loads OBJ meshes, places them in a scene, ticks it and reports what would be drawn.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Result, bail};
use asset::{MeshData, MeshUploader, ObjMeta, ParseOptions};
use corelib::{
    components::{RenderComponent, RotatingBehaviour},
    scene::{GameObject, Scene},
    transform::Transform,
    vec3,
};

const USAGE: &str = "usage: app [--strict] [--flip-v] [--gpu] [--ticks=N] <mesh.obj>...";
const FRAME_TIME: f32 = 1.0 / 60.0;
const DEFAULT_MATERIAL: &str = "default";

#[derive(Debug, PartialEq)]
struct Args {
    strict: bool,
    flip_v: bool,
    gpu: bool,
    ticks: u32,
    meshes: Vec<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            strict: false,
            flip_v: false,
            gpu: false,
            ticks: 3,
            meshes: Vec::new(),
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();

    for arg in args {
        match arg.as_str() {
            "--strict" => parsed.strict = true,
            "--flip-v" => parsed.flip_v = true,
            "--gpu" => parsed.gpu = true,
            _ => {
                if let Some(val) = arg.strip_prefix("--ticks=") {
                    parsed.ticks = match val.parse::<u32>() {
                        Ok(ticks) => ticks,
                        Err(_) => bail!("Invalid tick count '{}'\n{}", val, USAGE),
                    };
                } else if arg.starts_with("--") {
                    bail!("Unknown flag '{}'\n{}", arg, USAGE);
                } else {
                    parsed.meshes.push(PathBuf::from(arg));
                }
            }
        }
    }

    if parsed.meshes.is_empty() {
        bail!("No meshes given\n{}", USAGE);
    }
    Ok(parsed)
}

/// Command-line switches can only turn options on; the meta file decides the rest.
fn effective_options(meta: ObjMeta, args: &Args) -> ParseOptions {
    let mut options = meta.parse_options();
    options.reject_unknown_commands |= args.strict;
    options.flip_v |= args.flip_v;
    options
}

/// Keeps meshes on the CPU so they can be shared between render components.
struct SharedMeshes;

impl MeshUploader for SharedMeshes {
    type Handle = Arc<MeshData>;

    fn upload(&mut self, _label: &str, mesh: &MeshData) -> Result<Arc<MeshData>> {
        Ok(Arc::new(mesh.clone()))
    }
}

fn build_scene(args: &Args) -> Result<Scene> {
    let mut scene = Scene::new();

    for (i, path) in args.meshes.iter().enumerate() {
        let options = effective_options(ObjMeta::resolve(path)?, args);
        let mesh = asset::load_mesh_with(path, options, &mut SharedMeshes)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("mesh{i}"));
        let id = scene.spawn(
            name.clone(),
            Transform::from_translation(vec3(i as f32 * 2.0, 0.0, 0.0)),
        );
        scene.add_component(id, RenderComponent::new(mesh, DEFAULT_MATERIAL))?;
        scene.add_component(id, RotatingBehaviour::from_degrees(vec3(0.0, 45.0, 0.0)))?;
    }

    // Render components with unusable meshes turn themselves off here,
    // before anything reads them back.
    scene.awake();
    Ok(scene)
}

/// Objects with an enabled render component, in spawn order.
fn drawables(scene: &Scene) -> impl Iterator<Item = (&GameObject, &RenderComponent)> + '_ {
    scene
        .iter()
        .filter(|object| object.is_enabled::<RenderComponent>() == Some(true))
        .filter_map(|object| object.get::<RenderComponent>().map(|render| (object, render)))
}

/// Upload every drawable mesh, labelled with its object's name.
fn upload_all<U: MeshUploader>(scene: &Scene, uploader: &mut U) -> Result<Vec<U::Handle>> {
    drawables(scene)
        .map(|(object, render)| uploader.upload(object.name(), &render.mesh))
        .collect()
}

fn upload_to_gpu(scene: &Scene) -> Result<()> {
    let (device, _queue) = renderer::headless_device()?;
    let mut uploader = renderer::GpuUploader::new(&device);

    let gpu_meshes = upload_all(scene, &mut uploader)?;
    let vertices: u32 = gpu_meshes.iter().map(|mesh| mesh.vertex_count()).sum();
    log::info!(
        "{} meshes resident on GPU: {} vertices",
        gpu_meshes.len(),
        vertices
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    log::info!(
        "Starting Puck. meshes={}, strict={}, flip_v={}, gpu={}, ticks={}",
        args.meshes.len(),
        args.strict,
        args.flip_v,
        args.gpu,
        args.ticks
    );

    let mut scene = build_scene(&args)?;

    for _ in 0..args.ticks {
        scene.update(FRAME_TIME);
    }

    for (object, render) in drawables(&scene) {
        let (_, rotation, translation) = object.transform.matrix().to_scale_rotation_translation();
        log::info!(
            "draw '{}' ({}): {} triangles at {:?}, rotation {:?}",
            object.name(),
            render.material,
            render.mesh.triangle_count(),
            translation,
            rotation
        );
    }

    if args.gpu {
        if let Err(e) = upload_to_gpu(&scene) {
            log::warn!("GPU upload skipped: {e:#}");
        }
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
