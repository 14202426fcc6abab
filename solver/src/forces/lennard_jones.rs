use std::collections::HashMap;

use molsim_core::{Error, ParticleContainer, Result};
use serde::{Deserialize, Serialize};

use super::{begin_force_pass, lj_force};
use crate::grid::CellGrid;

/// Lennard-Jones well depth and zero-crossing distance for one particle
/// type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LjParameters {
    pub epsilon: f64,
    pub sigma: f64,
}

/// Precomputed pair coefficients in the rearranged force form.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LjCoefficients {
    /// `-24 * epsilon`
    pub alpha: f64,
    /// `sigma^6`
    pub beta: f64,
    /// `-2 * sigma^12`
    pub gamma: f64,
    /// Squared potential minimum distance, `(2^(1/6) * sigma)^2`.
    pub repulsive_squared: f64,
}

impl LjCoefficients {
    fn mixed(a: LjParameters, b: LjParameters) -> Self {
        // Lorentz-Berthelot combination rules.
        let epsilon = (a.epsilon * b.epsilon).sqrt();
        let sigma = 0.5 * (a.sigma + b.sigma);
        let sigma6 = sigma.powi(6);
        let repulsive = 2.0f64.powf(1.0 / 6.0) * sigma;
        LjCoefficients {
            alpha: -24.0 * epsilon,
            beta: sigma6,
            gamma: -2.0 * sigma6 * sigma6,
            repulsive_squared: repulsive * repulsive,
        }
    }
}

/// Mixed Lennard-Jones coefficients for every pair of particle types,
/// precomputed once at setup so the force loop never mixes or allocates.
#[derive(Clone, Debug, Default)]
pub struct LjTable {
    coefficients: HashMap<(u16, u16), LjCoefficients>,
    repulsive: HashMap<u16, f64>,
}

impl LjTable {
    pub fn new(parameters: &HashMap<u16, LjParameters>) -> Self {
        let mut coefficients = HashMap::new();
        let mut repulsive = HashMap::new();
        for (&a, &pa) in parameters {
            repulsive.insert(a, 2.0f64.powf(1.0 / 6.0) * pa.sigma);
            for (&b, &pb) in parameters {
                if a <= b {
                    coefficients.insert((a, b), LjCoefficients::mixed(pa, pb));
                }
            }
        }
        LjTable {
            coefficients,
            repulsive,
        }
    }

    /// Every particle type in the container must have parameters, so that
    /// the force loop can look pairs up infallibly.
    pub fn validate_container(&self, container: &ParticleContainer) -> Result<()> {
        for particle in container.iter() {
            if !self.repulsive.contains_key(&particle.type_id) {
                return Err(Error::MissingTypeParameters(particle.type_id));
            }
        }
        Ok(())
    }

    pub(crate) fn pair(&self, a: u16, b: u16) -> LjCoefficients {
        let key = if a <= b { (a, b) } else { (b, a) };
        debug_assert!(self.coefficients.contains_key(&key));
        self.coefficients.get(&key).copied().unwrap_or_default()
    }

    /// Distance of the potential minimum `2^(1/6) * sigma` for a type
    /// paired with itself.
    pub fn repulsive_distance(&self, type_id: u16) -> f64 {
        self.repulsive.get(&type_id).copied().unwrap_or_default()
    }
}

/// Brute-force Lennard-Jones pass over all pairs, without a cutoff. Only
/// usable for small counts; the reference the linked-cell kernels are
/// checked against.
pub fn force_lennard_jones(container: &mut ParticleContainer, table: &LjTable) {
    begin_force_pass(container, 0.0);
    container.for_each_pair(|p, q| {
        let coefficients = table.pair(p.type_id, q.type_id);
        let delta = p.position - q.position;
        let force = lj_force(
            coefficients.alpha,
            coefficients.beta,
            coefficients.gamma,
            &delta,
        );
        p.force += force;
        q.force -= force;
    });
}

/// Linked-cell Lennard-Jones pass: only pairs the stencil reaches and
/// within cutoff contribute, plus interactions with staged boundary
/// ghosts.
pub fn force_lennard_jones_lc(
    container: &mut ParticleContainer,
    grid: &CellGrid,
    table: &LjTable,
) {
    begin_force_pass(container, 0.0);
    accumulate_lj_pairs(container, grid, table);
}

/// Shared linked-cell accumulation: real-real pairs via Newton's third
/// law, real-ghost pairs into the real particle only.
pub(crate) fn accumulate_lj_pairs(
    container: &mut ParticleContainer,
    grid: &CellGrid,
    table: &LjTable,
) {
    let cutoff_squared = grid.cutoff_squared();
    grid.for_each_real_pair(container, |_, p, _, q| {
        let delta = p.position - q.position;
        if delta.norm_squared() > cutoff_squared {
            return;
        }
        let coefficients = table.pair(p.type_id, q.type_id);
        let force = lj_force(
            coefficients.alpha,
            coefficients.beta,
            coefficients.gamma,
            &delta,
        );
        p.force += force;
        q.force -= force;
    });
    grid.for_each_ghost_pair(container, |p, ghost| {
        let delta = p.position - ghost.position;
        if delta.norm_squared() > cutoff_squared {
            return;
        }
        let coefficients = table.pair(p.type_id, ghost.type_id);
        p.force += lj_force(
            coefficients.alpha,
            coefficients.beta,
            coefficients.gamma,
            &delta,
        );
    });
}
