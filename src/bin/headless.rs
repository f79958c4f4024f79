//! Run a sketch without a window and log its statistics.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use particle_sketch::{InputEvent, PointerSource, Preset, Sketch, SketchConfig};

#[derive(Parser, Debug)]
struct Args {
    /// Built-in sketch to run when no config file is given
    #[arg(long, default_value_t = Preset::Gravity)]
    preset: Preset,

    /// YAML sketch config; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Hold the mouse attractor at "x,y" for the whole run
    #[arg(long)]
    attractor: Option<String>,

    /// Log statistics every N frames
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn parse_point(s: &str) -> Result<cgmath::Vector2<f32>> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected \"x,y\", got \"{}\"", s);
    };
    Ok(cgmath::vec2(x.trim().parse()?, y.trim().parse()?))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SketchConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => args.preset.config(),
    };
    let mut sketch = Sketch::from_config(&config)?;

    if let Some(point) = &args.attractor {
        let position = parse_point(point)?;
        sketch.handle(&InputEvent::PointerDown {
            source: PointerSource::Mouse,
            position,
        });
    }

    let frame_delta = Duration::from_secs_f64(1.0 / 60.0);
    let report_every = args.report_every.max(1);
    let start = Instant::now();

    for _ in 0..args.frames {
        sketch.tick(frame_delta);
        if sketch.frame() % report_every == 0 {
            let stats = sketch.stats();
            log::info!(
                "frame {:>6}  mode={:?}  mean=({:.1}, {:.1})  spread={:.2}  flat={:.3}  v2={:.4}  entropy={:.3}",
                sketch.frame(),
                sketch.simulator().mode(),
                stats.mean_x,
                stats.mean_y,
                stats.spread,
                stats.flat_ratio,
                stats.average_velocity,
                stats.normalized_entropy,
            );
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "{} frames of {} particles in {:.3}s ({:.3}ms/frame)",
        args.frames,
        sketch.particles().len(),
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1000.0 / args.frames.max(1) as f64,
    );
    Ok(())
}
