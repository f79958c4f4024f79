use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use particle_sketch::{InputEvent, PointerSource, Preset, Sketch, SketchConfig, Viewport};

const PARTICLE_RADIUS: f32 = 1.0;
const ATTRACTOR_RADIUS: f32 = 8.0;

#[derive(Parser, Debug)]
struct Args {
    /// Built-in sketch to show when no config file is given
    #[arg(long, default_value_t = Preset::Gravity)]
    preset: Preset,

    /// YAML sketch config; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,
}

struct Viewer {
    sketch: Sketch,
    last_frame_time: Instant,
    update_time: Duration,
    pressed: Option<PointerSource>,
}

impl Viewer {
    fn new(config: &SketchConfig) -> Result<Self> {
        Ok(Self {
            sketch: Sketch::from_config(config)?,
            last_frame_time: Instant::now(),
            update_time: Duration::ZERO,
            pressed: None,
        })
    }

    /// Turn this frame's pointer state on the canvas into sketch input.
    fn forward_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let origin = response.rect.min;
        let position = response
            .interact_pointer_pos()
            .or(response.hover_pos())
            .map(|p| cgmath::vec2(p.x - origin.x, p.y - origin.y));
        let down = response.is_pointer_button_down_on();

        match (self.pressed, down, position) {
            (None, true, Some(position)) => {
                let source = if ctx.input(|i| i.any_touches()) {
                    PointerSource::Touch
                } else {
                    PointerSource::Mouse
                };
                self.sketch.handle(&InputEvent::PointerDown { source, position });
                self.pressed = Some(source);
            }
            (Some(source), true, Some(position)) => {
                self.sketch.handle(&InputEvent::PointerMove { source, position });
            }
            (Some(source), false, _) => {
                self.sketch.handle(&InputEvent::PointerUp { source });
                self.pressed = None;
            }
            _ => {}
        }
    }

    fn render_ui_panel(&mut self, ui: &mut egui::Ui, frame_time: f32) {
        ui.label(format!("FPS: {:.3}", 1.0 / frame_time.max(f32::EPSILON)));
        ui.label(format!("Frame Time: {:.3}ms", frame_time * 1000.0));
        ui.label(format!("Update Time: {:.3}ms", self.update_time.as_secs_f64() * 1000.0));
        ui.separator();

        let simulator = self.sketch.simulator();
        ui.label(format!("Particles: {}", simulator.len()));
        ui.label(format!("Mode: {:?}", simulator.mode()));
        ui.label(format!("Execution: {:?}", simulator.execution()));
        ui.label(format!("Frame: {}", self.sketch.frame()));
        ui.separator();

        let stats = *self.sketch.stats();
        ui.label(format!("Mean: ({:.1}, {:.1})", stats.mean_x, stats.mean_y));
        ui.label(format!("Spread: {:.2}", stats.spread));
        ui.label(format!("Flat Ratio: {:.3}", stats.flat_ratio));
        ui.label(format!("Mean Speed²: {:.4}", stats.average_velocity));
        ui.label(format!("Entropy: {:.3}", stats.normalized_entropy));
        ui.separator();

        ui.horizontal(|ui| {
            let label = if self.sketch.is_running() { "Stop" } else { "Start" };
            if ui.button(label).clicked() {
                if self.sketch.is_running() {
                    self.sketch.stop();
                } else {
                    self.sketch.start();
                }
            }
            if ui.button("Restart").clicked() {
                self.sketch.restart();
            }
        });
    }

    fn paint(&self, painter: &egui::Painter, rect: egui::Rect, ctx: &egui::Context) {
        let style = ctx.style();
        let particle_color = style.visuals.strong_text_color();
        let attractor_color = style.visuals.selection.bg_fill;

        for p in self.sketch.particles() {
            let pos = rect.min + egui::vec2(p.position.x, p.position.y);
            painter.circle_filled(pos, PARTICLE_RADIUS, particle_color);
        }
        for a in self.sketch.simulator().attractors().active() {
            let pos = rect.min + egui::vec2(a.position.x, a.position.y);
            painter.circle_stroke(pos, ATTRACTOR_RADIUS, egui::Stroke::new(1.5, attractor_color));
        }
    }
}

impl eframe::App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let current_time = Instant::now();
        let frame_delta = current_time.duration_since(self.last_frame_time);
        self.last_frame_time = current_time;

        egui::SidePanel::left("Control Panel").show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_ui_panel(ui, frame_delta.as_secs_f32());
                ui.allocate_space(ui.available_size());
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(ctx.style().visuals.panel_fill))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::drag());
                let rect = response.rect;

                let viewport = self.sketch.simulator().viewport();
                if viewport != Viewport::new(rect.width(), rect.height()) {
                    self.sketch.handle(&InputEvent::Resize {
                        width: rect.width(),
                        height: rect.height(),
                    });
                }
                self.forward_pointer(ctx, &response);

                let start_update = Instant::now();
                self.sketch.tick(frame_delta);
                self.update_time = start_update.elapsed();

                self.paint(&painter, rect, ctx);
            });

        ctx.request_repaint();
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SketchConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            log::info!("Starting {} sketch", args.preset);
            args.preset.config()
        }
    };
    // Canvas matches the configured viewport; the control panel sits beside it.
    let window = egui::vec2(config.viewport.width + 220.0, config.viewport.height);
    let viewer = Viewer::new(&config)?;

    eframe::run_native(
        "Particle Sketch",
        eframe::NativeOptions {
            renderer: eframe::Renderer::Wgpu,
            initial_window_size: Some(window),
            ..Default::default()
        },
        Box::new(move |_cc| Box::new(viewer)),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {}", e))
}
