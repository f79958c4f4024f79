//! Input events that drive attractors.
//!
//! Hosts translate their raw window or touch events into [`InputEvent`]s
//! already expressed in viewport pixel coordinates, then hand them to
//! [`apply`] (usually through [`Sketch::handle`](crate::Sketch::handle)).
//! Events a sketch has no use for are simply never produced.

use serde::{Deserialize, Serialize};

use crate::attractor::AttractorSource;
use crate::params::Viewport;
use crate::simulator::Simulator;

/// Which pointer device an event came from. Each owns its own attractor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch,
}

impl From<PointerSource> for AttractorSource {
    fn from(source: PointerSource) -> Self {
        match source {
            PointerSource::Mouse => AttractorSource::Mouse,
            PointerSource::Touch => AttractorSource::Touch,
        }
    }
}

/// One point reported by an external tracking driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPoint {
    pub position: cgmath::Vector2<f32>,
    /// Continuous signal, e.g. how closed a tracked hand is.
    pub strength: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown {
        source: PointerSource,
        position: cgmath::Vector2<f32>,
    },
    PointerMove {
        source: PointerSource,
        position: cgmath::Vector2<f32>,
    },
    PointerUp {
        source: PointerSource,
    },
    /// Latest frame from a tracking driver; `points[i]` drives tracker slot `i`.
    Tracking {
        points: Vec<TrackedPoint>,
    },
    Resize {
        width: f32,
        height: f32,
    },
}

/// How input maps onto attractor power.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Power given to a pressed pointer.
    pub pointer_power: f32,
    /// Number of attractors reserved for tracked points.
    pub tracker_slots: usize,
    /// Multiplier from tracked strength to attractor power.
    pub tracker_power_scale: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            pointer_power: 1.0,
            tracker_slots: 2,
            tracker_power_scale: 1.0,
        }
    }
}

/// Route one event to the simulator's attractors or viewport.
pub fn apply(event: &InputEvent, simulator: &mut Simulator, settings: &InputSettings) {
    match event {
        InputEvent::PointerDown { source, position } => {
            if let Some(a) = simulator.attractors_mut().get_mut((*source).into()) {
                a.position = *position;
                a.set_power(settings.pointer_power);
            }
        }
        InputEvent::PointerMove { source, position } => {
            if let Some(a) = simulator.attractors_mut().get_mut((*source).into()) {
                a.position = *position;
            }
        }
        InputEvent::PointerUp { source } => {
            if let Some(a) = simulator.attractors_mut().get_mut((*source).into()) {
                a.set_power(0.0);
            }
        }
        InputEvent::Tracking { points } => {
            let attractors = simulator.attractors_mut();
            let slots = attractors.tracker_slots();
            if points.len() > slots {
                log::debug!("Ignoring {} tracked points beyond {} slots", points.len() - slots, slots);
            }
            for i in 0..slots {
                let Some(a) = attractors.get_mut(AttractorSource::Tracker(i)) else {
                    continue;
                };
                match points.get(i) {
                    Some(point) => {
                        a.position = point.position;
                        a.set_power(point.strength * settings.tracker_power_scale);
                    }
                    None => a.set_power(0.0),
                }
            }
        }
        InputEvent::Resize { width, height } => {
            if *width > 0.0 && *height > 0.0 {
                simulator.resize(Viewport::new(*width, *height));
            } else {
                log::debug!("Ignoring degenerate resize to {}x{}", width, height);
            }
        }
    }
}
