use molsim_core::ParticleContainer;
use na::Vector3;
use rayon::prelude::*;

use super::{accumulate_lj_pairs, begin_force_pass, lj_force, LjTable};
use crate::grid::CellGrid;

/// Linked-cell Lennard-Jones with a constant gravity field along y.
pub fn force_mixed_lj_gravity_lc(
    container: &mut ParticleContainer,
    grid: &CellGrid,
    table: &LjTable,
    gravity_constant: f64,
) {
    begin_force_pass(container, gravity_constant);
    accumulate_lj_pairs(container, grid, table);
}

/// Task-parallel variant of [`force_mixed_lj_gravity_lc`].
///
/// The non-halo cells are split into `partitions` contiguous chunks; each
/// chunk accumulates into its own private force buffer, buffers are merged
/// by elementwise sum, and the merged total is applied in one parallel
/// pass. No particle is written concurrently, so the result matches the
/// sequential kernel up to floating-point summation order.
pub fn force_mixed_lj_gravity_lc_task(
    container: &mut ParticleContainer,
    grid: &CellGrid,
    table: &LjTable,
    gravity_constant: f64,
    partitions: usize,
) {
    begin_force_pass(container, gravity_constant);

    let count = container.len();
    let cutoff_squared = grid.cutoff_squared();
    let active: Vec<_> = grid.cells().iter().filter(|cell| !cell.is_halo()).collect();
    let chunk_size = ((active.len() + partitions.max(1) - 1) / partitions.max(1)).max(1);

    let particles = &container.particles;
    let pair_force = |i: usize, j: usize| -> Vector3<f64> {
        let delta = particles[i].position - particles[j].position;
        if delta.norm_squared() > cutoff_squared {
            return Vector3::zeros();
        }
        let coefficients = table.pair(particles[i].type_id, particles[j].type_id);
        lj_force(
            coefficients.alpha,
            coefficients.beta,
            coefficients.gamma,
            &delta,
        )
    };

    let totals = active
        .par_chunks(chunk_size)
        .map(|cells| {
            let mut local = vec![Vector3::zeros(); count];
            for cell in cells {
                for a in 0..cell.particles.len() {
                    for b in (a + 1)..cell.particles.len() {
                        let (i, j) = (cell.particles[a], cell.particles[b]);
                        let force = pair_force(i, j);
                        local[i] += force;
                        local[j] -= force;
                    }
                }
                for &neighbor_index in cell.stencil() {
                    let neighbor = grid.cell(neighbor_index);
                    for &i in &cell.particles {
                        for &j in &neighbor.particles {
                            let force = pair_force(i, j);
                            local[i] += force;
                            local[j] -= force;
                        }
                        for &g in &neighbor.ghosts {
                            let ghost = &grid.ghosts()[g];
                            let delta = particles[i].position - ghost.position;
                            if delta.norm_squared() > cutoff_squared {
                                continue;
                            }
                            let coefficients =
                                table.pair(particles[i].type_id, ghost.type_id);
                            local[i] += lj_force(
                                coefficients.alpha,
                                coefficients.beta,
                                coefficients.gamma,
                                &delta,
                            );
                        }
                    }
                }
            }
            local
        })
        .reduce(
            || vec![Vector3::zeros(); count],
            |mut accumulated, local| {
                for (total, partial) in accumulated.iter_mut().zip(local) {
                    *total += partial;
                }
                accumulated
            },
        );

    container
        .particles
        .par_iter_mut()
        .zip(totals)
        .for_each(|(particle, total)| particle.force += total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use molsim_core::Particle;
    use std::collections::HashMap;

    use crate::forces::LjParameters;

    fn setup() -> (ParticleContainer, CellGrid, LjTable) {
        let mut container = ParticleContainer::new();
        for x in 0..4 {
            for y in 0..4 {
                container.push(Particle::new(
                    Vector3::new(1.0 + 1.1 * x as f64, 1.0 + 1.1 * y as f64, 4.5),
                    Vector3::zeros(),
                    1.0,
                ));
            }
        }
        let mut grid =
            CellGrid::new(Vector3::zeros(), Vector3::new(9.0, 9.0, 9.0), 3.0).expect("valid grid");
        grid.rebuild(&container).expect("rebuild");
        let mut parameters = HashMap::new();
        parameters.insert(
            0,
            LjParameters {
                epsilon: 1.0,
                sigma: 1.0,
            },
        );
        (container, grid, LjTable::new(&parameters))
    }

    #[test]
    fn task_kernel_matches_sequential_kernel() {
        let (mut sequential, grid, table) = setup();
        force_mixed_lj_gravity_lc(&mut sequential, &grid, &table, -12.44);
        for partitions in [1, 3, 16] {
            let (mut parallel, grid, table) = setup();
            force_mixed_lj_gravity_lc_task(&mut parallel, &grid, &table, -12.44, partitions);
            for (p, q) in sequential.iter().zip(parallel.iter()) {
                assert_relative_eq!(p.force, q.force, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn gravity_seed_reaches_every_particle() {
        let (mut container, grid, table) = setup();
        // Far apart enough that only gravity acts on the corner particle.
        container.particles.truncate(1);
        let mut grid2 = grid;
        grid2.rebuild(&container).expect("rebuild");
        force_mixed_lj_gravity_lc(&mut container, &grid2, &table, -9.81);
        assert_relative_eq!(container.particles[0].force.y, -9.81);
        assert_relative_eq!(container.particles[0].force.x, 0.0);
    }
}
