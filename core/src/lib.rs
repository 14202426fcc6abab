mod container;
mod error;
mod particle;

extern crate nalgebra as na;

pub use container::ParticleContainer;
pub use error::{Error, Result};
pub use particle::Particle;
