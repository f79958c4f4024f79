//! Force accumulation, drag and integration over a fixed particle population.

use cgmath::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attractor::{Attractor, AttractorSet};
use crate::error::{Error, Result};
use crate::params::{Layout, Mode, ResetPolicy, SimulationParams, Viewport};
use crate::particle::Particle;

/// How a step is spread over threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Execution {
    /// Every particle is advanced on the calling thread.
    #[default]
    Serial,
    /// The population is split into `count` contiguous index ranges, each
    /// advanced independently on a dedicated worker pool.
    Workers { count: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    resets: usize,
    recovered: usize,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            resets: self.resets + other.resets,
            recovered: self.recovered + other.recovered,
        }
    }
}

/// Everything a particle update reads, computed once per step.
struct StepContext {
    active: Vec<Attractor>,
    gravity: f32,
    drag: f32,
    dt: f32,
    min_distance: f32,
    reset: ResetPolicy,
    layout: Layout,
    viewport: Viewport,
    count: usize,
}

impl StepContext {
    fn new(
        params: &SimulationParams,
        attractors: &AttractorSet,
        viewport: Viewport,
        count: usize,
        dt: f32,
    ) -> (Self, Mode) {
        // Mode is chosen before any particle moves.
        let mode = Mode::select(attractors);
        let context = Self {
            active: attractors.active().copied().collect(),
            gravity: params.scaled_gravity(viewport),
            drag: params.drag_factor(mode, dt),
            dt,
            min_distance: params.min_distance,
            reset: params.reset,
            layout: params.layout,
            viewport,
            count,
        };
        (context, mode)
    }

    fn rest(&self, index: usize) -> Particle {
        Particle::at_rest(self.layout.position(index, self.count, self.viewport))
    }

    fn advance(&self, index: usize, particle: &mut Particle) -> Tally {
        let mut tally = Tally::default();

        if !particle.is_finite() {
            *particle = self.rest(index);
            tally.recovered += 1;
        }

        for attractor in &self.active {
            let offset = attractor.position - particle.position;
            let length = offset.magnitude().max(self.min_distance);
            particle.velocity += offset * (attractor.power() * self.gravity / length * self.dt);
        }

        particle.velocity *= self.drag;
        particle.position += particle.velocity * self.dt;
        particle.age = particle.age.saturating_add(1);

        if !particle.is_finite() {
            *particle = self.rest(index);
            tally.recovered += 1;
        } else if self.reset.should_reset(particle.position, particle.age, self.viewport) {
            *particle = self.rest(index);
            tally.resets += 1;
        }

        tally
    }

    fn advance_all(&self, particles: &mut [Particle]) -> Tally {
        particles
            .iter_mut()
            .enumerate()
            .fold(Tally::default(), |tally, (i, p)| tally.merge(self.advance(i, p)))
    }

    fn advance_partitioned(&self, particles: &mut [Particle], partitions: usize) -> Tally {
        let chunk_len = particles.len().div_ceil(partitions.max(1)).max(1);
        particles
            .par_chunks_mut(chunk_len)
            .enumerate()
            .map(|(chunk, slice)| {
                let base = chunk * chunk_len;
                slice
                    .iter_mut()
                    .enumerate()
                    .fold(Tally::default(), |tally, (j, p)| tally.merge(self.advance(base + j, p)))
            })
            .reduce(Tally::default, Tally::merge)
    }
}

/// Advance every particle by one step of length `dt`.
///
/// Forces come from the active attractors only. Particles that leave the
/// viewport (or outlive their lifetime, per the reset policy) or become
/// non-finite are put back at their canonical start position.
pub fn step(
    particles: &mut [Particle],
    attractors: &AttractorSet,
    params: &SimulationParams,
    viewport: Viewport,
    dt: f32,
) {
    let (context, _) = StepContext::new(params, attractors, viewport, particles.len(), dt);
    context.advance_all(particles);
}

/// Owns one sketch's particle population, its attractors and its parameters.
pub struct Simulator {
    params: SimulationParams,
    viewport: Viewport,
    particles: Vec<Particle>,
    attractors: AttractorSet,
    mode: Mode,
    workers: Option<(usize, rayon::ThreadPool)>,
}

impl Simulator {
    pub fn new(params: SimulationParams, viewport: Viewport, count: usize, attractors: AttractorSet) -> Self {
        let particles = (0..count)
            .map(|i| Particle::at_rest(params.layout.position(i, count, viewport)))
            .collect();

        log::info!(
            "Initialized {} particles ({:?} layout, {:?} reset) in {}x{} viewport",
            count,
            params.layout,
            params.reset,
            viewport.width,
            viewport.height
        );

        Self {
            params,
            viewport,
            particles,
            attractors,
            mode: Mode::Inertial,
            workers: None,
        }
    }

    /// Switch to partitioned stepping on a pool of `count` worker threads.
    pub fn with_workers(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidConfig("worker count must be at least 1".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(count)
            .thread_name(|i| format!("sketch-worker-{}", i))
            .build()?;
        log::info!("Stepping {} particles on {} workers", self.particles.len(), count);
        self.workers = Some((count, pool));
        Ok(self)
    }

    pub fn with_execution(self, execution: Execution) -> Result<Self> {
        match execution {
            Execution::Serial => Ok(self),
            Execution::Workers { count } => self.with_workers(count),
        }
    }

    pub fn execution(&self) -> Execution {
        match &self.workers {
            Some((count, _)) => Execution::Workers { count: *count },
            None => Execution::Serial,
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Direct access for hosts that displace particles themselves; anything
    /// left out of bounds or non-finite is repaired by the next step.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn attractors(&self) -> &AttractorSet {
        &self.attractors
    }

    pub fn attractors_mut(&mut self) -> &mut AttractorSet {
        &mut self.attractors
    }

    /// Mode used by the most recent step.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Canonical start position of particle `index`.
    pub fn home(&self, index: usize) -> cgmath::Vector2<f32> {
        self.params.layout.position(index, self.particles.len(), self.viewport)
    }

    /// Put every particle back at rest on its start position.
    pub fn restart(&mut self) {
        let (count, viewport, layout) = (self.particles.len(), self.viewport, self.params.layout);
        for (i, p) in self.particles.iter_mut().enumerate() {
            *p = Particle::at_rest(layout.position(i, count, viewport));
        }
        log::info!("Restarted {} particles", count);
    }

    /// Adopt new viewport bounds. Particles now outside are reset on the next step.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            log::info!("Viewport resized to {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
        }
    }

    /// Advance by the configured fixed step.
    pub fn step(&mut self) {
        self.step_by(self.params.dt);
    }

    /// Advance by an explicit step length.
    pub fn step_by(&mut self, dt: f32) {
        let (context, mode) =
            StepContext::new(&self.params, &self.attractors, self.viewport, self.particles.len(), dt);

        if mode != self.mode {
            log::debug!("Drag regime {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }

        let tally = match &self.workers {
            Some((count, pool)) => {
                let particles = &mut self.particles;
                pool.install(|| context.advance_partitioned(particles, *count))
            }
            None => context.advance_all(&mut self.particles),
        };

        if tally.recovered > 0 {
            log::warn!("Recovered {} particles with non-finite state", tally.recovered);
        }
        log::trace!("Step dt={} mode={:?} resets={}", dt, mode, tally.resets);
    }
}
