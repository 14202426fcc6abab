mod gravity;
mod lennard_jones;
mod membrane;
mod mixed;

pub use gravity::*;
pub use lennard_jones::*;
pub use membrane::*;
pub use mixed::*;

use molsim_core::ParticleContainer;
use na::Vector3;
use rayon::prelude::*;

/// Starts a force pass over the whole container: moves the accumulated
/// force into the old force and seeds the accumulator, with constant
/// gravity `g * m` along y when `gravity_constant` is non-zero.
pub(crate) fn begin_force_pass(container: &mut ParticleContainer, gravity_constant: f64) {
    container.particles.par_iter_mut().for_each(|particle| {
        let seed = Vector3::new(0.0, gravity_constant * particle.mass, 0.0);
        particle.begin_force_pass(seed);
    });
}

/// Rearranged 12-6 Lennard-Jones force on the first particle of a pair,
/// with `delta` pointing from the second towards the first and
/// `d = |delta|^2`:
///
/// `(alpha / d) * (beta / d^3 + gamma / d^6) * delta`
///
/// where `alpha = -24 eps`, `beta = sigma^6`, `gamma = -2 sigma^12`. The
/// grouping saves the square root and one division over the textbook
/// form.
pub(crate) fn lj_force(alpha: f64, beta: f64, gamma: f64, delta: &Vector3<f64>) -> Vector3<f64> {
    let d = delta.norm_squared();
    let d3 = d * d * d;
    let d6 = d3 * d3;
    (alpha / d) * (beta / d3 + gamma / d6) * delta
}

/// Harmonic bond force on the first particle of a pair: magnitude
/// `k * (|delta| - r0)`, pulling towards the partner when stretched.
pub(crate) fn harmonic_force(k: f64, r0: f64, delta: &Vector3<f64>) -> Vector3<f64> {
    let distance = delta.norm();
    -(k * (distance - r0) / distance) * delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lj_force_vanishes_at_potential_minimum() {
        // Equilibrium of the 12-6 potential sits at r = 2^(1/6) * sigma.
        let (epsilon, sigma): (f64, f64) = (1.0, 1.0);
        let (alpha, beta, gamma) = (
            -24.0 * epsilon,
            sigma.powi(6),
            -2.0 * sigma.powi(12),
        );
        let r = 2.0f64.powf(1.0 / 6.0) * sigma;
        let delta = Vector3::new(r, 0.0, 0.0);
        let force = lj_force(alpha, beta, gamma, &delta);
        assert_relative_eq!(force.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lj_force_is_repulsive_below_the_minimum() {
        let (alpha, beta, gamma) = (-24.0, 1.0, -2.0);
        let delta = Vector3::new(1.0, 0.0, 0.0);
        let force = lj_force(alpha, beta, gamma, &delta);
        assert!(force.x > 0.0, "force should push the pair apart");
    }

    #[test]
    fn harmonic_force_restores_towards_rest_length() {
        let delta = Vector3::new(2.0, 0.0, 0.0);
        let stretched = harmonic_force(10.0, 1.0, &delta);
        assert!(stretched.x < 0.0, "stretched bond pulls back");
        let compressed = harmonic_force(10.0, 3.0, &delta);
        assert!(compressed.x > 0.0, "compressed bond pushes out");
        let at_rest = harmonic_force(10.0, 2.0, &delta);
        assert_relative_eq!(at_rest.norm(), 0.0, epsilon = 1e-12);
    }
}
