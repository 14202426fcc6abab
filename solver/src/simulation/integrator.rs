use molsim_core::ParticleContainer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Time integration scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Velocity Stoermer-Verlet. Positions advance with the current
    /// force, velocities with the average of the current and previous
    /// force.
    #[default]
    StroemerVerlet,
}

impl Integrator {
    pub fn update_positions(&self, container: &mut ParticleContainer, delta_time: f64) {
        match self {
            Integrator::StroemerVerlet => {
                container.particles.par_iter_mut().for_each(|particle| {
                    particle.position += delta_time * particle.velocity
                        + delta_time * delta_time / (2.0 * particle.mass) * particle.force;
                });
            }
        }
    }

    pub fn update_velocities(&self, container: &mut ParticleContainer, delta_time: f64) {
        match self {
            Integrator::StroemerVerlet => {
                container.particles.par_iter_mut().for_each(|particle| {
                    particle.velocity += delta_time / (2.0 * particle.mass)
                        * (particle.force + particle.old_force);
                });
            }
        }
    }
}
