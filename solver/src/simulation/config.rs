use std::collections::HashMap;

use molsim_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryConfig;
use crate::forces::{LjParameters, MembraneParameters};

/// Which force kernel drives the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceModel {
    /// All-pairs Newtonian gravity, baseline variant.
    Gravity,
    /// All-pairs Newtonian gravity using Newton's third law.
    GravityV2,
    /// All-pairs Lennard-Jones without a cutoff.
    LennardJones,
    /// Linked-cell Lennard-Jones with cutoff and boundary ghosts.
    LennardJonesLc,
    /// Linked-cell membrane model: harmonic bonds plus truncated
    /// intra-molecular Lennard-Jones and constant gravity.
    Membrane,
    /// Linked-cell Lennard-Jones with a constant gravity field.
    MixedLjGravityLc,
    /// Task-parallel variant of the mixed kernel.
    MixedLjGravityLcTask,
}

impl ForceModel {
    /// Whether the kernel looks up Lennard-Jones pair coefficients.
    pub fn uses_lj_table(self) -> bool {
        !matches!(self, ForceModel::Gravity | ForceModel::GravityV2)
    }
}

/// Everything needed to set up a [`Simulation`], read from a scenario
/// file.
///
/// [`Simulation`]: super::Simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub domain_origin: [f64; 3],
    pub domain_size: [f64; 3],
    pub cutoff: f64,
    pub force_model: ForceModel,
    #[serde(default)]
    pub boundaries: BoundaryConfig,
    #[serde(default)]
    pub lj_parameters: HashMap<u16, LjParameters>,
    #[serde(default)]
    pub gravity_constant: f64,
    #[serde(default)]
    pub membrane_parameters: Option<MembraneParameters>,
    #[serde(default)]
    pub task_partitions: Option<usize>,
    /// Treat a particle still outside the domain after the post-step
    /// boundary pass as an error instead of leaving it for the next step.
    #[serde(default)]
    pub strict_containment: bool,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        self.boundaries.validate()?;
        if self.force_model == ForceModel::Membrane && self.membrane_parameters.is_none() {
            return Err(Error::MissingMembraneParameters);
        }
        Ok(())
    }
}
