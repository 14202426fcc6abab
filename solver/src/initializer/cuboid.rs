use molsim_core::{Particle, ParticleContainer};
use na::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::maxwell_boltzmann_velocity;

/// A rectangular lattice of identical particles.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CuboidCluster {
    pub origin: [f64; 3],
    /// Particles along each axis.
    pub count: [usize; 3],
    pub spacing: f64,
    pub mass: f64,
    pub initial_velocity: [f64; 3],
    /// Mean thermal speed added on top of the drift velocity.
    #[serde(default)]
    pub mean_speed: f64,
    #[serde(default)]
    pub type_id: u16,
}

impl CuboidCluster {
    pub fn generate<R: Rng>(
        &self,
        container: &mut ParticleContainer,
        dimensionality: usize,
        rng: &mut R,
    ) {
        let origin = Vector3::from(self.origin);
        let drift = Vector3::from(self.initial_velocity);
        for x in 0..self.count[0] {
            for y in 0..self.count[1] {
                for z in 0..self.count[2] {
                    let offset =
                        self.spacing * Vector3::new(x as f64, y as f64, z as f64);
                    let velocity = drift
                        + maxwell_boltzmann_velocity(self.mean_speed, dimensionality, rng);
                    let mut particle = Particle::new(origin + offset, velocity, self.mass);
                    particle.type_id = self.type_id;
                    container.push(particle);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_the_full_lattice() {
        let cluster = CuboidCluster {
            origin: [1.0, 1.0, 1.0],
            count: [3, 2, 4],
            spacing: 1.5,
            mass: 2.0,
            initial_velocity: [0.0, -1.0, 0.0],
            mean_speed: 0.0,
            type_id: 1,
        };
        let mut container = ParticleContainer::new();
        let mut rng = StdRng::seed_from_u64(0);
        cluster.generate(&mut container, 3, &mut rng);
        assert_eq!(container.len(), 24);
        let last = &container.particles[23];
        assert_eq!(last.position, Vector3::new(4.0, 2.5, 5.5));
        assert_eq!(last.velocity, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(last.mass, 2.0);
        assert_eq!(last.type_id, 1);
    }
}
