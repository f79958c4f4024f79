//! The per-frame driver a host calls from its own scheduling primitive.
//!
//! A [`Sketch`] owns all of one visual effect's state. The host calls
//! [`Sketch::tick`] once per frame (animation-frame callback, egui repaint,
//! a plain loop) and forwards input through [`Sketch::handle`]; nothing is
//! rescheduled implicitly, and `stop` makes further ticks no-ops.

use std::time::Duration;

use encase::{ArrayLength, ShaderType, StorageBuffer};
use serde::{Deserialize, Serialize};

use crate::attractor::AttractorSet;
use crate::config::SketchConfig;
use crate::error::{Error, Result};
use crate::input::{self, InputEvent, InputSettings};
use crate::particle::Particle;
use crate::simulator::Simulator;
use crate::stats::Stats;

/// How the step length handed to the simulator is derived from a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeStep {
    /// Always the configured `dt`, whatever the frame rate.
    #[default]
    Fixed,
    /// `dt` scaled by the measured frame delta relative to `reference_fps`,
    /// capped at `max_scale` so a stalled frame cannot fling particles away.
    FrameScaled { reference_fps: f32, max_scale: f32 },
}

impl TimeStep {
    pub fn dt(&self, base: f32, frame_delta: Duration) -> f32 {
        match *self {
            TimeStep::Fixed => base,
            TimeStep::FrameScaled { reference_fps, max_scale } => {
                base * (frame_delta.as_secs_f32() * reference_fps).min(max_scale)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// Particle layout as read by a GPU vertex/storage binding.
#[derive(ShaderType)]
struct GpuParticles<'a> {
    pub viewport: cgmath::Vector2<f32>,
    pub length: ArrayLength,
    #[size(runtime)]
    pub particles: &'a [Particle],
}

pub struct Sketch {
    simulator: Simulator,
    input: InputSettings,
    time_step: TimeStep,
    stats: Stats,
    frame: u64,
    state: RunState,
}

impl Sketch {
    pub fn new(simulator: Simulator, input: InputSettings, time_step: TimeStep) -> Self {
        let stats = Stats::compute(simulator.particles());
        Self {
            simulator,
            input,
            time_step,
            stats,
            frame: 0,
            state: RunState::Running,
        }
    }

    pub fn from_config(config: &SketchConfig) -> Result<Self> {
        config.validate()?;
        let simulator = Simulator::new(
            config.simulation,
            config.viewport,
            config.particle_count(),
            AttractorSet::new(config.input.tracker_slots),
        )
        .with_execution(config.execution)?;
        Ok(Self::new(simulator, config.input, config.time_step))
    }

    pub fn start(&mut self) {
        if self.state == RunState::Stopped {
            log::info!("Sketch started at frame {}", self.frame);
            self.state = RunState::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            log::info!("Sketch stopped at frame {}", self.frame);
            self.state = RunState::Stopped;
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Run one frame. Returns `false` without touching any state when stopped.
    pub fn tick(&mut self, frame_delta: Duration) -> bool {
        if !self.is_running() {
            return false;
        }
        let dt = self.time_step.dt(self.simulator.params().dt, frame_delta);
        self.simulator.step_by(dt);
        self.stats = Stats::compute(self.simulator.particles());
        self.frame += 1;
        true
    }

    pub fn handle(&mut self, event: &InputEvent) {
        input::apply(event, &mut self.simulator, &self.input);
    }

    /// Lay every particle out again and release all attractors.
    pub fn restart(&mut self) {
        self.simulator.attractors_mut().release_all();
        self.simulator.restart();
        self.stats = Stats::compute(self.simulator.particles());
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    pub fn particles(&self) -> &[Particle] {
        self.simulator.particles()
    }

    /// Statistics as of the last tick (or construction/restart).
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time_step(&self) -> TimeStep {
        self.time_step
    }

    /// Encode the viewport and particle array into `out` as a GPU storage buffer,
    /// replacing its previous contents.
    pub fn write_vertices(&self, out: &mut Vec<u8>) -> Result<()> {
        out.clear();
        let viewport = self.simulator.viewport();
        let mut storage = StorageBuffer::new(std::mem::take(out));
        let written = storage.write(&GpuParticles {
            viewport: cgmath::vec2(viewport.width, viewport.height),
            length: ArrayLength,
            particles: self.simulator.particles(),
        });
        *out = storage.into_inner();
        written.map_err(|e| Error::VertexBuffer(e.to_string()))
    }
}
