use na::Vector3;
use rand::Rng;
use rand_distr::StandardNormal;

/// Thermal velocity drawn from a Maxwell-Boltzmann distribution: each
/// active axis gets an independent gaussian component scaled by the mean
/// thermal speed. The z component stays zero in flat domains.
pub fn maxwell_boltzmann_velocity<R: Rng>(
    mean_speed: f64,
    dimensionality: usize,
    rng: &mut R,
) -> Vector3<f64> {
    let mut velocity = Vector3::zeros();
    for axis in 0..dimensionality {
        let gaussian: f64 = rng.sample(StandardNormal);
        velocity[axis] = mean_speed * gaussian;
    }
    velocity
}
