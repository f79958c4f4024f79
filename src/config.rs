//! Sketch configuration loaded from YAML.
//!
//! Every section is optional; missing fields fall back to defaults.
//!
//! ```yaml
//! simulation:
//!   gravity: 1.5
//!   pulling_drag: 0.93
//!   inertial_drag: 0.54
//!   dt: 1.0
//!   min_distance: 1.0
//!   reset:
//!     kind: bounds_or_lifetime
//!     max_age: 600
//!   layout:
//!     kind: grid
//! viewport:
//!   width: 1280.0
//!   height: 720.0
//! population:
//!   count: 8000          # omit to pick from the viewport width
//! time_step:
//!   kind: frame_scaled
//!   reference_fps: 60.0
//!   max_scale: 3.0
//! execution:
//!   kind: workers
//!   count: 4
//! input:
//!   pointer_power: 1.0
//!   tracker_slots: 2
//!   tracker_power_scale: 1.0
//! ```

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::input::InputSettings;
use crate::params::{Layout, ResetPolicy, SimulationParams, Viewport, population_for_width};
use crate::simulator::Execution;
use crate::sketch::TimeStep;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Fixed particle count; `None` picks one from the viewport width.
    pub count: Option<usize>,
}

impl PopulationConfig {
    pub fn resolve(&self, viewport: Viewport) -> usize {
        self.count.unwrap_or_else(|| population_for_width(viewport.width))
    }
}

/// Everything needed to build a [`Sketch`](crate::Sketch).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub simulation: SimulationParams,
    pub viewport: Viewport,
    pub population: PopulationConfig,
    pub time_step: TimeStep,
    pub execution: Execution,
    pub input: InputSettings,
}

impl SketchConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SketchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let config: SketchConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        log::info!("Loaded sketch config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn particle_count(&self) -> usize {
        self.population.resolve(self.viewport)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        check(sim.dt.is_finite() && sim.dt > 0.0, || format!("dt must be positive, got {}", sim.dt))?;
        check(sim.gravity.is_finite() && sim.gravity >= 0.0, || {
            format!("gravity must be non-negative, got {}", sim.gravity)
        })?;
        for (name, drag) in [("pulling_drag", sim.pulling_drag), ("inertial_drag", sim.inertial_drag)] {
            check(drag > 0.0 && drag <= 1.0, || format!("{} must be in (0, 1], got {}", name, drag))?;
        }
        check(sim.min_distance.is_finite() && sim.min_distance > 0.0, || {
            format!("min_distance must be positive, got {}", sim.min_distance)
        })?;
        if let Some(max_age) = sim.reset.max_age() {
            check(max_age > 0, || "max_age must be at least 1".to_string())?;
        }

        let Viewport { width, height } = self.viewport;
        check(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0, || {
            format!("viewport must have positive size, got {}x{}", width, height)
        })?;

        if let Execution::Workers { count } = self.execution {
            check(count > 0, || "worker count must be at least 1".to_string())?;
        }
        if let TimeStep::FrameScaled { reference_fps, max_scale } = self.time_step {
            check(reference_fps.is_finite() && reference_fps > 0.0, || {
                format!("reference_fps must be positive, got {}", reference_fps)
            })?;
            check(max_scale.is_finite() && max_scale > 0.0, || {
                format!("max_scale must be positive, got {}", max_scale)
            })?;
        }

        check(self.input.pointer_power.is_finite() && self.input.pointer_power >= 0.0, || {
            format!("pointer_power must be non-negative, got {}", self.input.pointer_power)
        })?;
        check(self.input.tracker_power_scale.is_finite(), || {
            "tracker_power_scale must be finite".to_string()
        })?;
        Ok(())
    }
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok { Ok(()) } else { Err(Error::InvalidConfig(message())) }
}

/// Tuned configurations for the sketches in the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Line of particles pulled toward the pointer, reset at the edges.
    Gravity,
    /// Grid of dots, reset at the edges.
    Dots,
    /// Line that is never reset and reconverges on the pointer.
    Line,
    /// Scattered field stepped by measured frame time, reset at edges or with age.
    Cymatics,
    /// Short-lived particles recycled purely by age.
    Flame,
}

impl Preset {
    pub const ALL: [Preset; 5] = [Preset::Gravity, Preset::Dots, Preset::Line, Preset::Cymatics, Preset::Flame];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Gravity => "gravity",
            Preset::Dots => "dots",
            Preset::Line => "line",
            Preset::Cymatics => "cymatics",
            Preset::Flame => "flame",
        }
    }

    pub fn config(&self) -> SketchConfig {
        let base = SketchConfig::default();
        let simulation = base.simulation;
        match self {
            Preset::Gravity => base,
            Preset::Dots => SketchConfig {
                simulation: SimulationParams {
                    gravity: 1.0,
                    layout: Layout::Grid,
                    ..simulation
                },
                ..base
            },
            Preset::Line => SketchConfig {
                simulation: SimulationParams {
                    gravity: 2.0,
                    reset: ResetPolicy::Never,
                    ..simulation
                },
                ..base
            },
            Preset::Cymatics => SketchConfig {
                simulation: SimulationParams {
                    gravity: 0.8,
                    layout: Layout::Scatter { seed: 7 },
                    reset: ResetPolicy::BoundsOrLifetime { max_age: 600 },
                    ..simulation
                },
                time_step: TimeStep::FrameScaled {
                    reference_fps: 60.0,
                    max_scale: 3.0,
                },
                ..base
            },
            Preset::Flame => SketchConfig {
                simulation: SimulationParams {
                    gravity: 3.0,
                    min_distance: 4.0,
                    reset: ResetPolicy::Lifetime { max_age: 90 },
                    ..simulation
                },
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(Preset::name).collect();
                format!("unknown preset '{}', expected one of: {}", s, names.join(", "))
            })
    }
}
