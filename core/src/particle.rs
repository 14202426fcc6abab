use na::Vector3;
use serde::{Deserialize, Serialize};

/// Structure that keeps all data for a single particle.
///
/// A particle is owned by exactly one [`ParticleContainer`]; every other
/// structure (cells, membranes, boundary handlers) refers to it by its
/// index in the container.
///
/// [`ParticleContainer`]: crate::ParticleContainer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Particle {
    /// Position of the particle in 3D space.
    pub position: Vector3<f64>,
    /// Velocity of the particle.
    pub velocity: Vector3<f64>,
    /// Sum of the forces acting on the particle in the current step.
    pub force: Vector3<f64>,
    /// Force of the previous step, kept for the velocity half-step of the
    /// Stroemer-Verlet integration.
    pub old_force: Vector3<f64>,
    /// Mass of the particle.
    pub mass: f64,
    /// Type of the particle. Selects the interaction parameters.
    pub type_id: u16,
    /// Molecule the particle belongs to, if any. Particles of the same
    /// molecule interact through bonds instead of the full pair potential.
    pub molecule_id: Option<u32>,
}

impl Particle {
    /// Create a new particle at `position` with `velocity` and `mass`,
    /// type 0 and no molecule. Forces start out zeroed.
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, mass: f64) -> Self {
        Particle {
            position,
            velocity,
            force: Vector3::zeros(),
            old_force: Vector3::zeros(),
            mass,
            type_id: 0,
            molecule_id: None,
        }
    }

    /// Moves the accumulated force into `old_force` and restarts the
    /// accumulator at `seed`. Called exactly once per force pass, so force
    /// and old force are never mixed within a step.
    pub fn begin_force_pass(&mut self, seed: Vector3<f64>) {
        self.old_force = self.force;
        self.force = seed;
    }
}

impl Default for Particle {
    /// Default particle for tests: everything zero except `mass`, which
    /// is 1.0.
    fn default() -> Self {
        Particle::new(Vector3::zeros(), Vector3::zeros(), 1.0)
    }
}
