use std::collections::HashSet;

use molsim_core::ParticleContainer;
use serde::{Deserialize, Serialize};

use super::{begin_force_pass, harmonic_force, lj_force, LjTable};
use crate::grid::CellGrid;

/// Harmonic bond stiffness and rest length of a membrane sheet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MembraneParameters {
    pub stiffness: f64,
    pub bond_length: f64,
}

/// A sheet of particles tied together by harmonic bonds.
///
/// Bonds are half-stored: each unordered bond appears once, and the
/// harmonic pass applies equal and opposite forces to both partners.
/// Diagonal bonds rest at `sqrt(2)` times the direct bond length.
#[derive(Clone, Debug)]
pub struct Membrane {
    pub molecule_id: u32,
    pub stiffness: f64,
    pub bond_length: f64,
    direct_bonds: Vec<(usize, usize)>,
    diagonal_bonds: Vec<(usize, usize)>,
    bonded: HashSet<(usize, usize)>,
}

impl Membrane {
    pub fn new(molecule_id: u32, parameters: MembraneParameters) -> Self {
        Membrane {
            molecule_id,
            stiffness: parameters.stiffness,
            bond_length: parameters.bond_length,
            direct_bonds: vec![],
            diagonal_bonds: vec![],
            bonded: HashSet::new(),
        }
    }

    pub fn add_direct_bond(&mut self, a: usize, b: usize) {
        self.direct_bonds.push((a, b));
        self.bonded.insert(Self::key(a, b));
    }

    pub fn add_diagonal_bond(&mut self, a: usize, b: usize) {
        self.diagonal_bonds.push((a, b));
        self.bonded.insert(Self::key(a, b));
    }

    pub fn is_bonded(&self, a: usize, b: usize) -> bool {
        self.bonded.contains(&Self::key(a, b))
    }

    pub fn direct_bonds(&self) -> &[(usize, usize)] {
        &self.direct_bonds
    }

    pub fn diagonal_bonds(&self) -> &[(usize, usize)] {
        &self.diagonal_bonds
    }

    fn key(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }
}

/// Membrane force pass: harmonic forces along the stored bonds, truncated
/// repulsive Lennard-Jones between non-bonded particles of the same
/// molecule, full Lennard-Jones against everything else, and a constant
/// gravity field along y.
pub fn force_membrane(
    container: &mut ParticleContainer,
    grid: &CellGrid,
    membranes: &[Membrane],
    table: &LjTable,
    gravity_constant: f64,
) {
    begin_force_pass(container, gravity_constant);

    for membrane in membranes {
        for &(a, b) in membrane.direct_bonds() {
            let (p, q) = container.get_pair_mut(a, b);
            let force = harmonic_force(
                membrane.stiffness,
                membrane.bond_length,
                &(p.position - q.position),
            );
            p.force += force;
            q.force -= force;
        }
        let diagonal_length = std::f64::consts::SQRT_2 * membrane.bond_length;
        for &(a, b) in membrane.diagonal_bonds() {
            let (p, q) = container.get_pair_mut(a, b);
            let force = harmonic_force(
                membrane.stiffness,
                diagonal_length,
                &(p.position - q.position),
            );
            p.force += force;
            q.force -= force;
        }
    }

    let bonded: HashSet<(usize, usize)> = membranes
        .iter()
        .flat_map(|membrane| membrane.bonded.iter().copied())
        .collect();

    let cutoff_squared = grid.cutoff_squared();
    grid.for_each_real_pair(container, |i, p, j, q| {
        let delta = p.position - q.position;
        let distance_squared = delta.norm_squared();
        if distance_squared > cutoff_squared {
            return;
        }
        let coefficients = table.pair(p.type_id, q.type_id);
        let same_molecule =
            p.molecule_id.is_some() && p.molecule_id == q.molecule_id;
        if same_molecule {
            // Bonded neighbors interact through the harmonic term alone;
            // the rest of the sheet only repels to avoid self-collapse.
            if bonded.contains(&Membrane::key(i, j))
                || distance_squared >= coefficients.repulsive_squared
            {
                return;
            }
        }
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
        let distance_squared = delta.norm_squared();
        if distance_squared > cutoff_squared {
            return;
        }
        let coefficients = table.pair(p.type_id, ghost.type_id);
        let same_molecule =
            p.molecule_id.is_some() && p.molecule_id == ghost.molecule_id;
        if same_molecule && distance_squared >= coefficients.repulsive_squared {
            return;
        }
        p.force += lj_force(
            coefficients.alpha,
            coefficients.beta,
            coefficients.gamma,
            &delta,
        );
    });
}
