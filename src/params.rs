//! Simulation parameters and the policies they select between.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::attractor::AttractorSet;

/// Viewports narrower than this are treated as mobile: fewer particles and
/// proportionally weaker gravity.
pub const SMALL_VIEWPORT_WIDTH: f32 = 768.0;

pub const MOBILE_POPULATION: usize = 5_000;
pub const DESKTOP_POPULATION: usize = 15_000;

pub const PULLING_DRAG_CONSTANT: f32 = 0.93;
pub const INERTIAL_DRAG_CONSTANT: f32 = 0.54;

/// Particle count for a host canvas of the given width.
pub fn population_for_width(width: f32) -> usize {
    if width < SMALL_VIEWPORT_WIDTH {
        MOBILE_POPULATION
    } else {
        DESKTOP_POPULATION
    }
}

/// The visible rectangle `[0, width] x [0, height]` in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, p: cgmath::Vector2<f32>) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn center(&self) -> cgmath::Vector2<f32> {
        cgmath::vec2(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Canonical starting shape of the population. A particle's start position is
/// a pure function of its index, the population size and the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    /// Evenly spaced along the horizontal centre line.
    Line,
    /// Row-major grid filling the viewport.
    Grid,
    /// Uniformly scattered, with each index drawing from its own seeded RNG.
    Scatter { seed: u64 },
}

impl Layout {
    pub fn position(&self, index: usize, count: usize, viewport: Viewport) -> cgmath::Vector2<f32> {
        let count = count.max(1);
        match *self {
            Layout::Line => cgmath::vec2(
                (index as f32 + 0.5) / count as f32 * viewport.width,
                viewport.height * 0.5,
            ),
            Layout::Grid => {
                let aspect = if viewport.height > 0.0 {
                    viewport.width / viewport.height
                } else {
                    1.0
                };
                let cols = ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count);
                let rows = count.div_ceil(cols);
                let (row, col) = (index / cols, index % cols);
                cgmath::vec2(
                    (col as f32 + 0.5) / cols as f32 * viewport.width,
                    (row as f32 + 0.5) / rows as f32 * viewport.height,
                )
            }
            Layout::Scatter { seed } => {
                let mut rng = StdRng::seed_from_u64(
                    seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                );
                cgmath::vec2(
                    rng.gen_range(0.0..1.0f32) * viewport.width,
                    rng.gen_range(0.0..1.0f32) * viewport.height,
                )
            }
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Line
    }
}

/// When a particle is sent back to its canonical start position.
///
/// Particles with non-finite state are reset under every policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Reset on leaving the viewport.
    Bounds,
    /// Reset once `age` exceeds `max_age` steps.
    Lifetime { max_age: u32 },
    /// Reset on whichever of the two happens first.
    BoundsOrLifetime { max_age: u32 },
    /// Never reset; rely on attractors to pull particles back.
    Never,
}

impl ResetPolicy {
    pub fn should_reset(&self, position: cgmath::Vector2<f32>, age: u32, viewport: Viewport) -> bool {
        match *self {
            ResetPolicy::Bounds => !viewport.contains(position),
            ResetPolicy::Lifetime { max_age } => age > max_age,
            ResetPolicy::BoundsOrLifetime { max_age } => age > max_age || !viewport.contains(position),
            ResetPolicy::Never => false,
        }
    }

    /// Whether every particle is guaranteed to be inside the viewport after a step.
    pub fn keeps_in_bounds(&self) -> bool {
        matches!(self, ResetPolicy::Bounds | ResetPolicy::BoundsOrLifetime { .. })
    }

    pub fn max_age(&self) -> Option<u32> {
        match *self {
            ResetPolicy::Lifetime { max_age } | ResetPolicy::BoundsOrLifetime { max_age } => Some(max_age),
            _ => None,
        }
    }
}

impl Default for ResetPolicy {
    fn default() -> Self {
        ResetPolicy::Bounds
    }
}

/// Damping regime, chosen every step from the attractor powers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// No active attractor; particles coast.
    Inertial,
    /// At least one active attractor.
    Pulling,
}

impl Mode {
    pub fn select(attractors: &AttractorSet) -> Self {
        if attractors.any_active() {
            Mode::Pulling
        } else {
            Mode::Inertial
        }
    }
}

/// Constants of one sketch's simulation; fixed for the lifetime of a simulator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub gravity: f32,
    pub pulling_drag: f32,
    pub inertial_drag: f32,
    /// Fixed step length.
    pub dt: f32,
    /// Lower clamp for the particle-attractor distance.
    pub min_distance: f32,
    pub reset: ResetPolicy,
    pub layout: Layout,
}

impl SimulationParams {
    pub fn drag_constant(&self, mode: Mode) -> f32 {
        match mode {
            Mode::Pulling => self.pulling_drag,
            Mode::Inertial => self.inertial_drag,
        }
    }

    /// Per-step velocity multiplier `drag^dt`.
    pub fn drag_factor(&self, mode: Mode, dt: f32) -> f32 {
        self.drag_constant(mode).powf(dt)
    }

    /// Gravity weakened linearly below [`SMALL_VIEWPORT_WIDTH`].
    pub fn scaled_gravity(&self, viewport: Viewport) -> f32 {
        self.gravity * (viewport.width / SMALL_VIEWPORT_WIDTH).clamp(0.0, 1.0)
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            gravity: 1.5,
            pulling_drag: PULLING_DRAG_CONSTANT,
            inertial_drag: INERTIAL_DRAG_CONSTANT,
            dt: 1.0,
            min_distance: 1.0,
            reset: ResetPolicy::default(),
            layout: Layout::default(),
        }
    }
}
