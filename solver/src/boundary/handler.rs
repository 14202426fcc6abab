use log::{debug, trace};
use molsim_core::{Error, ParticleContainer, Result};
use serde::{Deserialize, Serialize};

use super::Face;
use crate::forces::LjTable;
use crate::grid::CellGrid;

/// Boundary condition applied at one domain face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Particles that leave the domain are removed.
    Outflow,
    /// Particles wrap around to the opposite face; the halo on the
    /// opposite side is populated with translated ghost copies.
    Periodic,
    /// Particles within cutoff of the wall are mirrored into the halo, so
    /// the pair potential acts as a wall force; penetrating particles are
    /// folded back with their normal velocity flipped.
    Reflective,
    /// Like `Reflective`, but the mirror is only staged while it sits
    /// within the repulsive distance `2^(1/6) * sigma`, so the wall never
    /// attracts.
    SoftReflective,
}

/// Per-face boundary condition selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub x_low: BoundaryKind,
    pub x_high: BoundaryKind,
    pub y_low: BoundaryKind,
    pub y_high: BoundaryKind,
    pub z_low: BoundaryKind,
    pub z_high: BoundaryKind,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        BoundaryConfig::uniform(BoundaryKind::Outflow)
    }
}

impl BoundaryConfig {
    pub fn uniform(kind: BoundaryKind) -> Self {
        BoundaryConfig {
            x_low: kind,
            x_high: kind,
            y_low: kind,
            y_high: kind,
            z_low: kind,
            z_high: kind,
        }
    }

    pub fn kind(&self, face: Face) -> BoundaryKind {
        match face {
            Face::XLow => self.x_low,
            Face::XHigh => self.x_high,
            Face::YLow => self.y_low,
            Face::YHigh => self.y_high,
            Face::ZLow => self.z_low,
            Face::ZHigh => self.z_high,
        }
    }

    /// A periodic face needs a periodic opposite face, otherwise wrapped
    /// particles and translated ghosts have no matching side.
    pub fn validate(&self) -> Result<()> {
        for face in Face::ALL {
            if self.kind(face) == BoundaryKind::Periodic
                && self.kind(face.opposite()) != BoundaryKind::Periodic
            {
                return Err(Error::UnpairedPeriodicFace(face.name()));
            }
        }
        Ok(())
    }
}

/// Applies one boundary condition at one face.
///
/// Handlers mutate only their own face's halo and the particles crossing
/// their own face, so the order in which the six handlers run does not
/// affect the result.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryHandler {
    pub face: Face,
    pub kind: BoundaryKind,
}

impl BoundaryHandler {
    pub fn new(face: Face, kind: BoundaryKind) -> Self {
        BoundaryHandler { face, kind }
    }

    /// Stages halo state before a force pass. A no-op for particles that
    /// do not approach this face within cutoff.
    pub fn apply_before_force(
        &self,
        container: &ParticleContainer,
        grid: &mut CellGrid,
        table: &LjTable,
    ) {
        match self.kind {
            BoundaryKind::Outflow => {}
            BoundaryKind::Periodic => self.stage_periodic_images(container, grid),
            BoundaryKind::Reflective => self.stage_mirrors(container, grid, None),
            BoundaryKind::SoftReflective => self.stage_mirrors(container, grid, Some(table)),
        }
    }

    /// Repairs particle state after the force pass and integration:
    /// wraps, folds back or removes particles that crossed this face.
    /// Returns the number of particles removed.
    pub fn apply_after_force(&self, container: &mut ParticleContainer, grid: &CellGrid) -> usize {
        let axis = self.face.axis();
        let plane = self.face.plane(grid.domain_origin(), grid.domain_size());
        let extent = grid.domain_size()[axis];
        match self.kind {
            BoundaryKind::Outflow => {
                let before = container.len();
                container.retain(|particle| !self.crossed(&particle.position, plane));
                let removed = before - container.len();
                if removed > 0 {
                    debug!("outflow at {} removed {} particles", self.face.name(), removed);
                }
                removed
            }
            BoundaryKind::Periodic => {
                let shift = if self.face.is_low() { extent } else { -extent };
                for particle in container.iter_mut() {
                    if self.crossed(&particle.position, plane) {
                        particle.position[axis] += shift;
                    }
                }
                0
            }
            BoundaryKind::Reflective => {
                for particle in container.iter_mut() {
                    if self.crossed(&particle.position, plane) {
                        particle.position[axis] = 2.0 * plane - particle.position[axis];
                        particle.velocity[axis] = -particle.velocity[axis];
                    }
                }
                0
            }
            BoundaryKind::SoftReflective => {
                for particle in container.iter_mut() {
                    if self.crossed(&particle.position, plane) {
                        particle.position[axis] = 2.0 * plane - particle.position[axis];
                    }
                }
                0
            }
        }
    }

    /// Whether a position has passed through this face. The domain is
    /// half-open, so sitting exactly on the high plane already counts as
    /// outside.
    fn crossed(&self, position: &na::Vector3<f64>, plane: f64) -> bool {
        let coordinate = position[self.face.axis()];
        if self.face.is_low() {
            coordinate < plane
        } else {
            coordinate >= plane
        }
    }

    /// Translates every particle within cutoff of this face by one domain
    /// extent and stages the copy in the opposite halo. Already staged
    /// ghosts are translated as well, which produces the diagonal images
    /// at corners where several periodic faces meet, independent of
    /// handler order.
    fn stage_periodic_images(&self, container: &ParticleContainer, grid: &mut CellGrid) {
        let axis = self.face.axis();
        let cutoff = grid.cutoff();
        let plane = self.face.plane(grid.domain_origin(), grid.domain_size());
        let shift = if self.face.is_low() {
            grid.domain_size()[axis]
        } else {
            -grid.domain_size()[axis]
        };

        let mut images = vec![];
        for particle in container.iter().chain(grid.ghosts().iter()) {
            let distance = self.face.inward_distance(&particle.position, plane);
            // Sources already beyond this face are ghosts staged by the
            // opposite handler; translating them would fold them back in.
            if distance < 0.0 || distance > cutoff {
                continue;
            }
            let mut image = particle.clone();
            image.position[axis] += shift;
            images.push(image);
        }
        trace!(
            "periodic boundary at {} staged {} images",
            self.face.name(),
            images.len()
        );
        for image in images {
            grid.push_ghost(image);
        }
    }

    /// Mirrors particles approaching the wall into the adjacent halo. The
    /// soft variant keeps a mirror only while it is within the repulsive
    /// distance of its source, so only the repulsive branch of the
    /// potential ever acts.
    fn stage_mirrors(
        &self,
        container: &ParticleContainer,
        grid: &mut CellGrid,
        soft_table: Option<&LjTable>,
    ) {
        let axis = self.face.axis();
        let cutoff = grid.cutoff();
        let plane = self.face.plane(grid.domain_origin(), grid.domain_size());

        let mut mirrors = vec![];
        for particle in container.iter() {
            let distance = self.face.inward_distance(&particle.position, plane);
            if distance < 0.0 || distance > cutoff {
                continue;
            }
            // The mirror sits at twice the wall distance.
            if let Some(table) = soft_table {
                if 2.0 * distance > table.repulsive_distance(particle.type_id) {
                    continue;
                }
            }
            let mut mirror = particle.clone();
            mirror.position[axis] = 2.0 * plane - mirror.position[axis];
            mirror.velocity[axis] = -mirror.velocity[axis];
            mirrors.push(mirror);
        }
        trace!(
            "reflective boundary at {} staged {} mirrors",
            self.face.name(),
            mirrors.len()
        );
        for mirror in mirrors {
            grid.push_ghost(mirror);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molsim_core::Particle;
    use na::Vector3;
    use std::collections::HashMap;

    use crate::forces::LjParameters;

    fn grid() -> CellGrid {
        CellGrid::new(Vector3::zeros(), Vector3::new(9.0, 9.0, 9.0), 3.0).expect("valid grid")
    }

    fn table() -> LjTable {
        let mut parameters = HashMap::new();
        parameters.insert(
            0,
            LjParameters {
                epsilon: 1.0,
                sigma: 1.0,
            },
        );
        LjTable::new(&parameters)
    }

    fn container_at(positions: &[[f64; 3]]) -> ParticleContainer {
        let mut container = ParticleContainer::new();
        for position in positions {
            container.push(Particle::new(
                Vector3::from(*position),
                Vector3::zeros(),
                1.0,
            ));
        }
        container
    }

    #[test]
    fn periodic_corner_images_are_complete_in_any_order() {
        let corner = [[0.5, 0.5, 4.5]];
        let pairs = [
            (Face::XLow, Face::YLow),
            (Face::YLow, Face::XLow),
        ];
        for (first, second) in pairs {
            let container = container_at(&corner);
            let mut grid = grid();
            grid.rebuild(&container).expect("rebuild");
            for face in [first, second] {
                BoundaryHandler::new(face, BoundaryKind::Periodic).apply_before_force(
                    &container, &mut grid, &table(),
                );
            }
            // Straight images across both faces plus the diagonal image.
            let mut positions: Vec<_> = grid
                .ghosts()
                .iter()
                .map(|ghost| (ghost.position.x as i64, ghost.position.y as i64))
                .collect();
            positions.sort_unstable();
            assert_eq!(positions, vec![(0, 9), (9, 0), (9, 9)]);
        }
    }

    #[test]
    fn periodic_images_keep_velocity_mass_and_type() {
        let mut container = ParticleContainer::new();
        let mut particle = Particle::new(
            Vector3::new(0.5, 4.5, 4.5),
            Vector3::new(1.0, -2.0, 3.0),
            4.0,
        );
        particle.type_id = 0;
        container.push(particle);
        let mut grid = grid();
        grid.rebuild(&container).expect("rebuild");
        BoundaryHandler::new(Face::XLow, BoundaryKind::Periodic).apply_before_force(
            &container,
            &mut grid,
            &table(),
        );
        let ghost = &grid.ghosts()[0];
        assert_eq!(ghost.position, Vector3::new(9.5, 4.5, 4.5));
        assert_eq!(ghost.velocity, Vector3::new(1.0, -2.0, 3.0));
        assert_eq!(ghost.mass, 4.0);
    }

    #[test]
    fn reflective_mirrors_only_particles_near_the_wall() {
        let container = container_at(&[[1.0, 4.5, 4.5], [4.5, 4.5, 4.5]]);
        let mut grid = grid();
        grid.rebuild(&container).expect("rebuild");
        BoundaryHandler::new(Face::XLow, BoundaryKind::Reflective).apply_before_force(
            &container,
            &mut grid,
            &table(),
        );
        assert_eq!(grid.ghosts().len(), 1);
        assert_eq!(grid.ghosts()[0].position.x, -1.0);
    }

    #[test]
    fn soft_reflective_skips_mirrors_beyond_the_repulsive_distance() {
        // 2 * 1.0 exceeds 2^(1/6) but 2 * 0.5 does not.
        let container = container_at(&[[1.0, 4.5, 4.5], [0.5, 4.5, 4.5]]);
        let mut grid = grid();
        grid.rebuild(&container).expect("rebuild");
        BoundaryHandler::new(Face::XLow, BoundaryKind::SoftReflective).apply_before_force(
            &container,
            &mut grid,
            &table(),
        );
        assert_eq!(grid.ghosts().len(), 1);
        assert_eq!(grid.ghosts()[0].position.x, -0.5);
    }

    #[test]
    fn outflow_removes_only_escaped_particles() {
        let mut container = container_at(&[[-0.5, 4.5, 4.5], [4.5, 4.5, 4.5]]);
        let grid = grid();
        let handler = BoundaryHandler::new(Face::XLow, BoundaryKind::Outflow);
        assert_eq!(handler.apply_after_force(&mut container, &grid), 1);
        assert_eq!(container.len(), 1);
        assert_eq!(container.particles[0].position.x, 4.5);
    }

    #[test]
    fn outflow_follows_the_half_open_domain_convention() {
        // The high plane itself is outside, the low plane is inside.
        let mut container = container_at(&[[9.0, 4.5, 4.5], [8.9, 4.5, 4.5]]);
        let grid = grid();
        let high = BoundaryHandler::new(Face::XHigh, BoundaryKind::Outflow);
        assert_eq!(high.apply_after_force(&mut container, &grid), 1);
        assert_eq!(container.particles[0].position.x, 8.9);

        let mut container = container_at(&[[0.0, 4.5, 4.5]]);
        let low = BoundaryHandler::new(Face::XLow, BoundaryKind::Outflow);
        assert_eq!(low.apply_after_force(&mut container, &grid), 0);
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn reflective_fold_back_flips_the_normal_velocity() {
        let mut container = container_at(&[[-0.25, 4.5, 4.5]]);
        container.particles[0].velocity = Vector3::new(-2.0, 1.0, 0.0);
        let grid = grid();
        BoundaryHandler::new(Face::XLow, BoundaryKind::Reflective)
            .apply_after_force(&mut container, &grid);
        assert_eq!(container.particles[0].position.x, 0.25);
        assert_eq!(container.particles[0].velocity, Vector3::new(2.0, 1.0, 0.0));
    }
}
