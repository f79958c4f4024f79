//! Population-level reductions used to drive audio parameters.

use crate::particle::Particle;

/// Snapshot statistics of a particle population.
///
/// An empty population yields all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub mean_x: f32,
    pub mean_y: f32,
    pub variance_x: f32,
    pub variance_y: f32,
    /// `sqrt(variance_x + variance_y)`.
    pub spread: f32,
    /// `variance_x / variance_y`, or zero when the population has no vertical extent.
    pub flat_ratio: f32,
    /// Mean squared speed.
    pub average_velocity: f32,
    /// `Σ l ln l` over distances `l` from the mean position.
    pub entropy: f32,
    /// `entropy / count`.
    pub normalized_entropy: f32,
}

impl Stats {
    pub fn compute(particles: &[Particle]) -> Self {
        if particles.is_empty() {
            return Self::default();
        }
        let n = particles.len() as f64;

        // Accumulate in f64; populations reach tens of thousands.
        let (mut sum_x, mut sum_y, mut sum_v2) = (0.0f64, 0.0f64, 0.0f64);
        for p in particles {
            sum_x += p.position.x as f64;
            sum_y += p.position.y as f64;
            sum_v2 += p.speed_squared() as f64;
        }
        let (mean_x, mean_y) = (sum_x / n, sum_y / n);

        let (mut var_x, mut var_y, mut entropy) = (0.0f64, 0.0f64, 0.0f64);
        for p in particles {
            let dx = p.position.x as f64 - mean_x;
            let dy = p.position.y as f64 - mean_y;
            var_x += dx * dx;
            var_y += dy * dy;
            let l = (dx * dx + dy * dy).sqrt();
            if l > 0.0 {
                entropy += l * l.ln();
            }
        }
        let (var_x, var_y) = (var_x / n, var_y / n);

        Self {
            count: particles.len(),
            mean_x: mean_x as f32,
            mean_y: mean_y as f32,
            variance_x: var_x as f32,
            variance_y: var_y as f32,
            spread: (var_x + var_y).sqrt() as f32,
            flat_ratio: if var_y > 0.0 { (var_x / var_y) as f32 } else { 0.0 },
            average_velocity: (sum_v2 / n) as f32,
            entropy: entropy as f32,
            normalized_entropy: (entropy / n) as f32,
        }
    }

    pub fn mean(&self) -> cgmath::Vector2<f32> {
        cgmath::vec2(self.mean_x, self.mean_y)
    }

    /// Every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.mean_x,
            self.mean_y,
            self.variance_x,
            self.variance_y,
            self.spread,
            self.flat_ratio,
            self.average_velocity,
            self.entropy,
            self.normalized_entropy,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
