use molsim_core::ParticleContainer;
use na::Vector3;

use super::begin_force_pass;

/// Pairwise Newtonian gravity, accumulated per particle from all others.
/// Visits every ordered pair, so each unordered pair is evaluated twice;
/// kept as the baseline the optimized variant is checked against.
pub fn force_gravity(container: &mut ParticleContainer) {
    let sums: Vec<Vector3<f64>> = container
        .iter()
        .map(|p| {
            let mut sum = Vector3::zeros();
            for q in container.iter() {
                let delta = q.position - p.position;
                let distance = delta.norm();
                if distance == 0.0 {
                    continue;
                }
                sum += p.mass * q.mass / distance.powi(3) * delta;
            }
            sum
        })
        .collect();
    for (particle, sum) in container.iter_mut().zip(sums) {
        particle.old_force = particle.force;
        particle.force = sum;
    }
}

/// Pairwise Newtonian gravity over unordered pairs, applying Newton's
/// third law so each pair is evaluated once.
pub fn force_gravity_v2(container: &mut ParticleContainer) {
    begin_force_pass(container, 0.0);
    container.for_each_pair(|p, q| {
        let delta = q.position - p.position;
        let distance = delta.norm();
        let force = p.mass * q.mass / distance.powi(3) * delta;
        p.force += force;
        q.force -= force;
    });
}
