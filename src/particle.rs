use cgmath::prelude::*;
use encase::ShaderType;

/// A point particle in viewport pixel space.
#[derive(Clone, Copy, Debug, PartialEq, ShaderType)]
pub struct Particle {
    pub position: cgmath::Vector2<f32>,
    pub velocity: cgmath::Vector2<f32>,
    /// Steps since the particle was created or last reset.
    pub age: u32,
}

impl Particle {
    /// A particle sitting still at `position`, as freshly laid out or reset.
    pub fn at_rest(position: cgmath::Vector2<f32>) -> Self {
        Self {
            position,
            velocity: cgmath::Vector2::zero(),
            age: 0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.velocity.x.is_finite()
            && self.velocity.y.is_finite()
    }

    pub fn speed_squared(&self) -> f32 {
        self.velocity.magnitude2()
    }
}
