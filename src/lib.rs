//! # Particle sketches
//!
//! A fixed population of 2D point particles pulled toward pointer, touch or
//! tracking-driven attractors, damped by one of two drag regimes and reset in
//! place when it leaves the viewport or outlives its lifetime. Population
//! statistics are exposed for whatever maps them onto sound.

pub mod attractor;
pub mod config;
pub mod error;
pub mod input;
pub mod params;
pub mod particle;
pub mod simulator;
pub mod sketch;
pub mod stats;

pub use attractor::{Attractor, AttractorSet, AttractorSource};
pub use config::{PopulationConfig, Preset, SketchConfig};
pub use error::{Error, Result};
pub use input::{InputEvent, InputSettings, PointerSource, TrackedPoint};
pub use params::{Layout, Mode, ResetPolicy, SimulationParams, Viewport};
pub use particle::Particle;
pub use simulator::{Execution, Simulator, step};
pub use sketch::{RunState, Sketch, TimeStep};
pub use stats::Stats;
