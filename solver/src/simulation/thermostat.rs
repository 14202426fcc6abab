use log::trace;
use molsim_core::ParticleContainer;
use serde::{Deserialize, Serialize};

/// Kinetic temperature of the system, with the Boltzmann constant folded
/// into the unit system: `T = sum(m |v|^2) / (d * N)`.
pub fn kinetic_temperature(container: &ParticleContainer, dimensionality: usize) -> f64 {
    if container.is_empty() {
        return 0.0;
    }
    let doubled_kinetic: f64 = container
        .iter()
        .map(|particle| particle.mass * particle.velocity.norm_squared())
        .sum();
    doubled_kinetic / (dimensionality as f64 * container.len() as f64)
}

/// Velocity-rescaling temperature control.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thermostat {
    #[default]
    None,
    /// Scales every velocity towards the target temperature; at most
    /// `max_delta` per application when set.
    VelocityRescaling {
        target: f64,
        #[serde(default)]
        max_delta: Option<f64>,
    },
}

impl Thermostat {
    pub fn apply(&self, container: &mut ParticleContainer, dimensionality: usize) {
        let Thermostat::VelocityRescaling { target, max_delta } = *self else {
            return;
        };
        let current = kinetic_temperature(container, dimensionality);
        if current == 0.0 {
            return;
        }
        let mut next = target;
        if let Some(max_delta) = max_delta {
            next = current + (target - current).clamp(-max_delta, max_delta);
        }
        let scale = (next / current).sqrt();
        trace!("thermostat rescaling {:.4} -> {:.4}", current, next);
        for particle in container.iter_mut() {
            particle.velocity *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use molsim_core::Particle;
    use na::Vector3;

    fn hot_container() -> ParticleContainer {
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::zeros(),
            Vector3::new(3.0, 0.0, 0.0),
            1.0,
        ));
        container.push(Particle::new(
            Vector3::zeros(),
            Vector3::new(0.0, -3.0, 0.0),
            1.0,
        ));
        container
    }

    #[test]
    fn rescaling_reaches_the_target() {
        let mut container = hot_container();
        let thermostat = Thermostat::VelocityRescaling {
            target: 1.0,
            max_delta: None,
        };
        thermostat.apply(&mut container, 3);
        assert_relative_eq!(kinetic_temperature(&container, 3), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn max_delta_limits_the_step() {
        let mut container = hot_container();
        let before = kinetic_temperature(&container, 3);
        let thermostat = Thermostat::VelocityRescaling {
            target: 0.0,
            max_delta: Some(1.0),
        };
        thermostat.apply(&mut container, 3);
        assert_relative_eq!(
            kinetic_temperature(&container, 3),
            before - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn resting_system_is_left_alone() {
        let mut container = ParticleContainer::new();
        container.push(Particle::default());
        let thermostat = Thermostat::VelocityRescaling {
            target: 5.0,
            max_delta: None,
        };
        thermostat.apply(&mut container, 3);
        assert_eq!(container.particles[0].velocity, Vector3::zeros());
    }
}
