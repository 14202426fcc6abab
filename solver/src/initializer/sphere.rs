use molsim_core::{Particle, ParticleContainer};
use na::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::maxwell_boltzmann_velocity;

/// A ball of identical particles cut from a cubic lattice.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SphereCluster {
    pub center: [f64; 3],
    /// Radius in lattice spacings.
    pub radius: usize,
    pub spacing: f64,
    pub mass: f64,
    pub initial_velocity: [f64; 3],
    #[serde(default)]
    pub mean_speed: f64,
    #[serde(default)]
    pub type_id: u16,
}

impl SphereCluster {
    pub fn generate<R: Rng>(
        &self,
        container: &mut ParticleContainer,
        dimensionality: usize,
        rng: &mut R,
    ) {
        let center = Vector3::from(self.center);
        let drift = Vector3::from(self.initial_velocity);
        let radius = self.radius as i64;
        let max_distance = self.radius as f64 * self.spacing;
        let z_range = if dimensionality == 2 {
            0..=0
        } else {
            -radius..=radius
        };
        for z in z_range {
            for y in -radius..=radius {
                for x in -radius..=radius {
                    let offset =
                        self.spacing * Vector3::new(x as f64, y as f64, z as f64);
                    if offset.norm() > max_distance {
                        continue;
                    }
                    let velocity = drift
                        + maxwell_boltzmann_velocity(self.mean_speed, dimensionality, rng);
                    let mut particle = Particle::new(center + offset, velocity, self.mass);
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
    fn all_particles_lie_within_the_radius() {
        let cluster = SphereCluster {
            center: [5.0, 5.0, 5.0],
            radius: 3,
            spacing: 1.0,
            mass: 1.0,
            initial_velocity: [0.0; 3],
            mean_speed: 0.0,
            type_id: 0,
        };
        let mut container = ParticleContainer::new();
        let mut rng = StdRng::seed_from_u64(0);
        cluster.generate(&mut container, 3, &mut rng);
        assert!(!container.is_empty());
        let center = Vector3::from(cluster.center);
        for particle in container.iter() {
            assert!((particle.position - center).norm() <= 3.0 + 1e-12);
        }
    }

    #[test]
    fn flat_spheres_are_disks() {
        let cluster = SphereCluster {
            center: [5.0, 5.0, 0.0],
            radius: 2,
            spacing: 1.0,
            mass: 1.0,
            initial_velocity: [0.0; 3],
            mean_speed: 0.0,
            type_id: 0,
        };
        let mut container = ParticleContainer::new();
        let mut rng = StdRng::seed_from_u64(0);
        cluster.generate(&mut container, 2, &mut rng);
        // 13 lattice points of the 5x5 square fall inside radius 2.
        assert_eq!(container.len(), 13);
        assert!(container.iter().all(|particle| particle.position.z == 0.0));
    }
}
