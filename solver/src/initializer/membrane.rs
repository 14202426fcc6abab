use molsim_core::{Particle, ParticleContainer};
use na::Vector3;
use serde::{Deserialize, Serialize};

use crate::forces::{Membrane, MembraneParameters};

/// A flat rectangular membrane sheet in the x-y plane.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MembraneSheet {
    pub origin: [f64; 3],
    /// Particles along x and y.
    pub count: [usize; 2],
    pub spacing: f64,
    pub mass: f64,
    pub initial_velocity: [f64; 3],
    #[serde(default)]
    pub type_id: u16,
    pub molecule_id: u32,
    pub parameters: MembraneParameters,
}

impl MembraneSheet {
    /// Appends the sheet's particles to the container and returns the
    /// membrane holding its harmonic bonds. Direct bonds tie lattice
    /// neighbors, diagonal bonds both lattice diagonals.
    pub fn generate(&self, container: &mut ParticleContainer) -> Membrane {
        let base = container.len();
        let origin = Vector3::from(self.origin);
        let velocity = Vector3::from(self.initial_velocity);
        let [width, height] = self.count;

        for x in 0..width {
            for y in 0..height {
                let offset = self.spacing * Vector3::new(x as f64, y as f64, 0.0);
                let mut particle = Particle::new(origin + offset, velocity, self.mass);
                particle.type_id = self.type_id;
                particle.molecule_id = Some(self.molecule_id);
                container.push(particle);
            }
        }

        let mut membrane = Membrane::new(self.molecule_id, self.parameters);
        let index = |x: usize, y: usize| base + x * height + y;
        for x in 0..width {
            for y in 0..height {
                if x + 1 < width {
                    membrane.add_direct_bond(index(x, y), index(x + 1, y));
                }
                if y + 1 < height {
                    membrane.add_direct_bond(index(x, y), index(x, y + 1));
                }
                if x + 1 < width && y + 1 < height {
                    membrane.add_diagonal_bond(index(x, y), index(x + 1, y + 1));
                }
                if x + 1 < width && y > 0 {
                    membrane.add_diagonal_bond(index(x, y), index(x + 1, y - 1));
                }
            }
        }
        membrane
    }
}
