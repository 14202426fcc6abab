use log::{debug, info};
use molsim_core::{Error, ParticleContainer, Result};
use na::Vector3;

use super::{ForceModel, Integrator, SimulationConfig};
use crate::boundary::{BoundaryHandler, Face};
use crate::forces;
use crate::forces::{LjTable, Membrane};
use crate::grid::CellGrid;

/// A running particle simulation: the container, the spatial index over
/// it, the boundary handlers and the selected force kernel, advanced one
/// time step at a time.
pub struct Simulation {
    pub container: ParticleContainer,
    grid: CellGrid,
    handlers: Vec<BoundaryHandler>,
    force_model: ForceModel,
    lj_table: LjTable,
    gravity_constant: f64,
    membranes: Vec<Membrane>,
    task_partitions: usize,
    integrator: Integrator,
    strict_containment: bool,
}

impl Simulation {
    pub fn new(config: &SimulationConfig, container: ParticleContainer) -> Result<Self> {
        config.validate()?;
        let grid = CellGrid::new(
            Vector3::from(config.domain_origin),
            Vector3::from(config.domain_size),
            config.cutoff,
        )?;
        let lj_table = LjTable::new(&config.lj_parameters);
        if config.force_model.uses_lj_table() {
            lj_table.validate_container(&container)?;
        }

        // A flat domain has no z faces to handle.
        let handlers = Face::ALL
            .into_iter()
            .filter(|face| grid.dimensionality() == 3 || face.axis() != 2)
            .map(|face| BoundaryHandler::new(face, config.boundaries.kind(face)))
            .collect();

        let mut simulation = Simulation {
            container,
            grid,
            handlers,
            force_model: config.force_model,
            lj_table,
            gravity_constant: config.gravity_constant,
            membranes: vec![],
            task_partitions: config
                .task_partitions
                .unwrap_or_else(rayon::current_num_threads),
            integrator: Integrator::default(),
            strict_containment: config.strict_containment,
        };
        simulation.rebuild_spatial_index()?;
        info!(
            "simulation set up with {} particles, {:?} kernel",
            simulation.container.len(),
            simulation.force_model
        );
        Ok(simulation)
    }

    pub fn add_membrane(&mut self, membrane: Membrane) {
        self.membranes.push(membrane);
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Computes the initial forces so the first integration step has a
    /// valid previous force. Call once before the step loop.
    pub fn initialize_forces(&mut self) -> Result<()> {
        self.rebuild_spatial_index()?;
        self.apply_boundary_conditions();
        self.compute_forces()?;
        self.finish_step()?;
        Ok(())
    }

    /// Advances the system by one time step: half-kick positions, rebuild
    /// the spatial index, stage boundary state, evaluate forces, finish
    /// the velocity update, then repair particles that left the domain.
    pub fn step(&mut self, delta_time: f64) -> Result<()> {
        self.integrator.update_positions(&mut self.container, delta_time);
        self.rebuild_spatial_index()?;
        self.apply_boundary_conditions();
        self.compute_forces()?;
        self.integrator.update_velocities(&mut self.container, delta_time);
        self.finish_step()?;
        Ok(())
    }

    /// Re-derives the particle-to-cell assignment from current positions.
    /// External drivers running the per-phase sequence themselves call
    /// this after moving particles, before boundary staging.
    pub fn rebuild_spatial_index(&mut self) -> Result<()> {
        self.grid.rebuild(&self.container)
    }

    /// Stages ghost particles for the upcoming force pass.
    pub fn apply_boundary_conditions(&mut self) {
        for handler in &self.handlers {
            handler.apply_before_force(&self.container, &mut self.grid, &self.lj_table);
        }
    }

    /// Runs the selected force kernel and checks the result for numerical
    /// blow-up.
    pub fn compute_forces(&mut self) -> Result<()> {
        match self.force_model {
            ForceModel::Gravity => forces::force_gravity(&mut self.container),
            ForceModel::GravityV2 => forces::force_gravity_v2(&mut self.container),
            ForceModel::LennardJones => {
                forces::force_lennard_jones(&mut self.container, &self.lj_table)
            }
            ForceModel::LennardJonesLc => {
                forces::force_lennard_jones_lc(&mut self.container, &self.grid, &self.lj_table)
            }
            ForceModel::Membrane => forces::force_membrane(
                &mut self.container,
                &self.grid,
                &self.membranes,
                &self.lj_table,
                self.gravity_constant,
            ),
            ForceModel::MixedLjGravityLc => forces::force_mixed_lj_gravity_lc(
                &mut self.container,
                &self.grid,
                &self.lj_table,
                self.gravity_constant,
            ),
            ForceModel::MixedLjGravityLcTask => forces::force_mixed_lj_gravity_lc_task(
                &mut self.container,
                &self.grid,
                &self.lj_table,
                self.gravity_constant,
                self.task_partitions,
            ),
        }

        let blown_up: Vec<usize> = self
            .container
            .iter()
            .enumerate()
            .filter(|(_, particle)| particle.force.iter().any(|component| !component.is_finite()))
            .map(|(i, _)| i)
            .collect();
        if !blown_up.is_empty() {
            return Err(Error::NonFiniteForce { indices: blown_up });
        }
        Ok(())
    }

    /// Post-force pass: wraps, folds back or removes particles that
    /// crossed a face and discards staged ghosts. With strict containment
    /// enabled, a particle still outside the domain after all handlers ran
    /// is an error instead of a condition left for the next step.
    pub fn finish_step(&mut self) -> Result<()> {
        let mut removed = 0;
        for handler in &self.handlers {
            removed += handler.apply_after_force(&mut self.container, &self.grid);
        }
        if removed > 0 {
            debug!("{} particles left the domain", removed);
        }
        self.grid.clear_ghosts();
        if self.strict_containment {
            self.check_containment()?;
        }
        Ok(())
    }

    fn check_containment(&self) -> Result<()> {
        let origin = self.grid.domain_origin();
        let size = self.grid.domain_size();
        for (index, particle) in self.container.iter().enumerate() {
            for axis in 0..self.grid.dimensionality() {
                let coordinate = particle.position[axis];
                if coordinate < origin[axis] || coordinate >= origin[axis] + size[axis] {
                    return Err(Error::ParticleLost { index });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use molsim_core::Particle;
    use std::collections::HashMap;

    use crate::boundary::{BoundaryConfig, BoundaryKind};
    use crate::forces::LjParameters;

    fn lj_config() -> SimulationConfig {
        let mut lj_parameters = HashMap::new();
        lj_parameters.insert(
            0,
            LjParameters {
                epsilon: 1.0,
                sigma: 1.0,
            },
        );
        SimulationConfig {
            domain_origin: [0.0; 3],
            domain_size: [9.0, 9.0, 9.0],
            cutoff: 3.0,
            force_model: ForceModel::LennardJonesLc,
            boundaries: BoundaryConfig::default(),
            lj_parameters,
            gravity_constant: 0.0,
            membrane_parameters: None,
            task_partitions: None,
            strict_containment: false,
        }
    }

    #[test]
    fn setup_rejects_unknown_particle_types() {
        let mut container = ParticleContainer::new();
        let mut particle = Particle::new(
            Vector3::new(4.5, 4.5, 4.5),
            Vector3::zeros(),
            1.0,
        );
        particle.type_id = 9;
        container.push(particle);
        assert_eq!(
            Simulation::new(&lj_config(), container).err(),
            Some(Error::MissingTypeParameters(9))
        );
    }

    #[test]
    fn outflow_removes_escaping_particles() {
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::new(0.1, 4.5, 4.5),
            Vector3::new(-10.0, 0.0, 0.0),
            1.0,
        ));
        let mut simulation = Simulation::new(&lj_config(), container).expect("setup");
        simulation.initialize_forces().expect("forces");
        for _ in 0..10 {
            simulation.step(0.01).expect("step");
        }
        assert!(simulation.container.is_empty());
    }

    #[test]
    fn periodic_step_wraps_positions() {
        let mut config = lj_config();
        config.boundaries = BoundaryConfig::uniform(BoundaryKind::Periodic);
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::new(8.9, 4.5, 4.5),
            Vector3::new(5.0, 0.0, 0.0),
            1.0,
        ));
        let mut simulation = Simulation::new(&config, container).expect("setup");
        simulation.initialize_forces().expect("forces");
        simulation.step(0.1).expect("step");
        let x = simulation.container.particles[0].position.x;
        assert!((0.0..9.0).contains(&x), "wrapped position, got {}", x);
        assert_relative_eq!(x, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn manual_phase_sequence_drives_the_simulation() {
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::new(7.0, 4.5, 4.5),
            Vector3::zeros(),
            1.0,
        ));
        container.push(Particle::new(
            Vector3::new(4.5, 4.5, 4.5),
            Vector3::zeros(),
            1.0,
        ));
        let mut simulation = Simulation::new(&lj_config(), container).expect("setup");

        // An external integrator moves a particle, then runs the phases
        // itself: rebuild, boundary staging, forces, post-step repair.
        simulation.container.particles[0].position = Vector3::new(5.6, 4.5, 4.5);
        simulation.rebuild_spatial_index().expect("rebuild");
        let index = simulation
            .grid()
            .cell_index_of(&Vector3::new(5.6, 4.5, 4.5));
        assert!(simulation.grid().cell(index).particles.contains(&0));

        simulation.apply_boundary_conditions();
        simulation.compute_forces().expect("forces");
        simulation.finish_step().expect("finish");

        // Separation 1.1 is inside the repulsive branch.
        let first = simulation.container.particles[0].force;
        let second = simulation.container.particles[1].force;
        assert!(first.x > 0.0);
        assert_relative_eq!(first, -second, epsilon = 1e-12);
    }

    #[test]
    fn strict_containment_reports_particles_no_handler_recovered() {
        let mut config = lj_config();
        config.boundaries = BoundaryConfig::uniform(BoundaryKind::Reflective);
        config.strict_containment = true;
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::new(4.5, 4.5, 4.5),
            Vector3::new(-2450.0, 0.0, 0.0),
            1.0,
        ));
        let mut simulation = Simulation::new(&config, container).expect("setup");
        simulation.initialize_forces().expect("forces");
        // One step overshoots the domain by more than a fold can repair.
        assert_eq!(
            simulation.step(0.01),
            Err(Error::ParticleLost { index: 0 })
        );
    }

    #[test]
    fn free_drift_follows_the_velocity() {
        let mut container = ParticleContainer::new();
        container.push(Particle::new(
            Vector3::new(4.5, 4.5, 4.5),
            Vector3::new(1.0, 0.0, 0.0),
            1.0,
        ));
        let mut simulation = Simulation::new(&lj_config(), container).expect("setup");
        simulation.initialize_forces().expect("forces");
        for _ in 0..100 {
            simulation.step(0.01).expect("step");
        }
        assert_relative_eq!(
            simulation.container.particles[0].position.x,
            5.5,
            epsilon = 1e-9
        );
    }
}
