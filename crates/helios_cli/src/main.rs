//! Command line frontend: render OBJ scenes to PPM images.

mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser};

use helios_core::graph::KdTreeBuilder;
use helios_core::obj::load_obj;
use helios_core::Scene;
use helios_math::{IVec4, Vec3};
use helios_renderer::{ppm, Camera, Scheduler, TracingKernel};

use crate::progress::ProgressObserver;

/// Vertical field of view of the default perspective projection.
const FOV_DEGREES: f32 = 50.0;

#[derive(Parser, Debug)]
#[command(
    name = "helios",
    about = "An offline CPU ray tracer for Wavefront OBJ scenes",
    disable_help_flag = true
)]
struct Args {
    /// Viewport width in pixels
    #[arg(short = 'w', default_value_t = 800)]
    width: i32,

    /// Viewport height in pixels
    #[arg(short = 'h', default_value_t = 800)]
    height: i32,

    /// Number of render workers, defaulting to the hardware thread count
    #[arg(short = 'N', default_value_t = num_cpus::get())]
    workers: usize,

    /// Number of film tiles
    #[arg(short = 'p', default_value_t = 64)]
    partitions: u32,

    /// Tile index range to render, as "(lo, hi)"
    #[arg(short = 'r', value_parser = parse_range)]
    range: Option<(usize, usize)>,

    /// Eye position, as "(x, y, z)"
    #[arg(short = 'e', value_parser = parse_vec3, default_value = "(2, 2, 4)")]
    eye: Vec3,

    /// Point the camera looks at, as "(x, y, z)"
    #[arg(short = 'c', value_parser = parse_vec3, default_value = "(0, 0, -1)")]
    center: Vec3,

    /// Up direction of the camera, as "(x, y, z)"
    #[arg(short = 'u', value_parser = parse_vec3, default_value = "(0, 1, 0)")]
    up: Vec3,

    /// Print help
    #[arg(long, action = ArgAction::HelpLong)]
    help: Option<bool>,

    /// Scene files to render, each to its own <basename>.ppm
    #[arg(required = true)]
    scenes: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (lo, hi) = args.range.unwrap_or((0, args.partitions as usize));

    let scheduler = Scheduler::new(Arc::new(TracingKernel::new()), args.workers, args.partitions)?
        .with_range(lo, hi)?
        .with_observer(Arc::new(ProgressObserver::new()));

    let camera = Camera::new(IVec4::new(0, 0, args.width, args.height))
        .look_at(args.eye, args.center - args.eye, args.up)
        .perspective(FOV_DEGREES.to_radians(), 1.0, 0.01, 10.0);

    for (index, path) in args.scenes.iter().enumerate() {
        let number = index + 1;

        println!("[{number}] Loading scene at \"{}\"", path.display());
        let primitives = load_obj(path).context("failed to load scene")?;
        log::info!("scene holds {} primitives", primitives.len());

        let mut builder = KdTreeBuilder::new();
        for primitive in primitives {
            builder.add(primitive);
        }
        // Scene files carry no lights; give them one at the eye
        let scene = Arc::new(Scene::new(Box::new(builder.build()), vec![args.eye]));

        println!(
            "[{number}] Rendering scene ({} workers, {} partitions)",
            args.workers, args.partitions
        );
        let start = Instant::now();
        let film = scheduler.render(&scene, &camera)?;
        println!(
            "[{number}] Rendering done (real {:.3}s)",
            start.elapsed().as_secs_f64()
        );

        let target = path.with_extension("ppm");
        ppm::write_file(&film, &target)
            .with_context(|| format!("failed to export {}", target.display()))?;
        println!("[{number}] Saved result to {}", target.display());
    }

    Ok(())
}

/// Parse a `"(x, y, z)"` vector argument.
fn parse_vec3(text: &str) -> Result<Vec3, String> {
    let parts = tuple_parts(text, 3)?;
    Ok(Vec3::new(parts[0], parts[1], parts[2]))
}

/// Parse a `"(lo, hi)"` tile range argument.
fn parse_range(text: &str) -> Result<(usize, usize), String> {
    let parts = tuple_parts(text, 2)?;
    if parts[0].fract() != 0.0 || parts[1].fract() != 0.0 || parts[0] < 0.0 || parts[1] < 0.0 {
        return Err(format!("expected non-negative integers, got '{text}'"));
    }
    Ok((parts[0] as usize, parts[1] as usize))
}

fn tuple_parts(text: &str, count: usize) -> Result<Vec<f32>, String> {
    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != count {
        return Err(format!("expected {count} comma-separated components, got '{text}'"));
    }
    parts
        .iter()
        .map(|part| {
            part.parse::<f32>()
                .map_err(|_| format!("invalid number '{part}'"))
        })
        .collect()
}
