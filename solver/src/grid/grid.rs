use itertools::iproduct;
use log::{debug, warn};
use molsim_core::{Error, Particle, ParticleContainer, Result};
use na::Vector3;

use super::{Cell, CellIndex, CellKind};

/// Half of the 26-neighborhood. Pairing every non-halo cell against these
/// offsets, plus its own intra-cell pairs, enumerates each unordered cell
/// relation exactly once.
const HALF_STENCIL_3D: [[i64; 3]; 13] = [
    [1, -1, -1],
    [1, 0, 0],
    [1, -1, 0],
    [1, 0, 1],
    [1, -1, 1],
    [1, 0, -1],
    [0, 0, 1],
    [0, -1, 1],
    [-1, -1, 1],
    [0, -1, 0],
    [0, -1, -1],
    [-1, -1, 0],
    [-1, -1, -1],
];

/// Half of the 8-neighborhood for flat domains.
const HALF_STENCIL_2D: [[i64; 3]; 4] = [[1, -1, 0], [1, 0, 0], [1, 1, 0], [0, -1, 0]];

/// Partitions the simulation domain into a regular grid of [`Cell`]s sized
/// to the force cutoff radius, with one layer of halo cells beyond every
/// face.
///
/// The grid maps particles to cells by index and owns the transient ghost
/// particles that boundary handlers stage into the halo. It never owns the
/// real particles and rebuilding never touches particle storage.
pub struct CellGrid {
    domain_origin: Vector3<f64>,
    domain_size: Vector3<f64>,
    cutoff: f64,
    cutoff_squared: f64,
    cell_size: Vector3<f64>,
    dims: [usize; 3],
    dimensionality: usize,
    cells: Vec<Cell>,
    ghost_pool: Vec<Particle>,
}

impl CellGrid {
    /// Builds the grid for the given domain and cutoff radius.
    ///
    /// Cells are cut to the smallest edge length that is at least `cutoff`
    /// and evenly divides the domain; axes shorter than the cutoff collapse
    /// to a single interior cell. A zero z-extent selects a 2D grid with a
    /// single cell layer and no halo in z.
    pub fn new(
        domain_origin: Vector3<f64>,
        domain_size: Vector3<f64>,
        cutoff: f64,
    ) -> Result<Self> {
        if !(cutoff > 0.0) || !cutoff.is_finite() {
            return Err(Error::InvalidCutoff(cutoff));
        }
        if domain_size.iter().any(|extent| !extent.is_finite() || *extent < 0.0) {
            return Err(Error::InvalidDomain(format!(
                "extents must be finite and non-negative, got {:?}",
                domain_size
            )));
        }
        if domain_size.x == 0.0 || domain_size.y == 0.0 {
            return Err(Error::InvalidDomain(
                "x and y extents must be positive".to_string(),
            ));
        }
        if domain_origin.iter().any(|coordinate| !coordinate.is_finite()) {
            return Err(Error::InvalidDomain(format!(
                "origin must be finite, got {:?}",
                domain_origin
            )));
        }

        let dimensionality = if domain_size.z == 0.0 { 2 } else { 3 };
        let mut dims = [1usize; 3];
        let mut cell_size = Vector3::zeros();
        for axis in 0..dimensionality {
            if domain_size[axis] < cutoff {
                // The whole axis fits into one interaction range.
                dims[axis] = 3;
                cell_size[axis] = domain_size[axis];
            } else {
                let interior = (domain_size[axis] / cutoff).floor() as usize;
                cell_size[axis] = domain_size[axis] / interior as f64;
                dims[axis] = interior + 2;
            }
        }

        let mut grid = CellGrid {
            domain_origin,
            domain_size,
            cutoff,
            cutoff_squared: cutoff * cutoff,
            cell_size,
            dims,
            dimensionality,
            cells: Vec::with_capacity(dims[0] * dims[1] * dims[2]),
            ghost_pool: vec![],
        };
        grid.initialize_cells();
        debug!(
            "built {}x{}x{} cell grid, cell size {:?}",
            dims[0], dims[1], dims[2], cell_size
        );
        Ok(grid)
    }

    fn initialize_cells(&mut self) {
        let [nx, ny, nz] = self.dims;
        for (x, y, z) in iproduct!(0..nx, 0..ny, 0..nz) {
            let index = [x, y, z];
            let mut cell = Cell::new(self.kind_of(index), index);
            if cell.kind != CellKind::Halo {
                cell.stencil = self.stencil_of(index);
            }
            self.cells.push(cell);
        }
    }

    fn kind_of(&self, index: CellIndex) -> CellKind {
        for axis in 0..self.dimensionality {
            if index[axis] == 0 || index[axis] == self.dims[axis] - 1 {
                return CellKind::Halo;
            }
        }
        for axis in 0..self.dimensionality {
            if index[axis] == 1 || index[axis] == self.dims[axis] - 2 {
                return CellKind::Boundary;
            }
        }
        CellKind::Inner
    }

    /// Half stencil of `index`, extended by every adjacent halo cell the
    /// half misses. Halo cells are never origin cells of the enumeration,
    /// so a boundary cell has to reach all of its halo neighbors itself.
    fn stencil_of(&self, index: CellIndex) -> Vec<CellIndex> {
        let offsets: &[[i64; 3]] = if self.dimensionality == 2 {
            &HALF_STENCIL_2D
        } else {
            &HALF_STENCIL_3D
        };
        let mut stencil: Vec<CellIndex> = offsets
            .iter()
            .filter_map(|offset| self.offset_index(index, *offset))
            .collect();
        for (dx, dy, dz) in iproduct!(-1i64..=1, -1i64..=1, -1i64..=1) {
            if dx == 0 && dy == 0 && dz == 0 {
                continue;
            }
            if let Some(neighbor) = self.offset_index(index, [dx, dy, dz]) {
                if self.kind_of(neighbor) == CellKind::Halo && !stencil.contains(&neighbor) {
                    stencil.push(neighbor);
                }
            }
        }
        stencil
    }

    fn offset_index(&self, index: CellIndex, offset: [i64; 3]) -> Option<CellIndex> {
        let mut neighbor = [0usize; 3];
        for axis in 0..3 {
            let shifted = index[axis] as i64 + offset[axis];
            if shifted < 0 || shifted >= self.dims[axis] as i64 {
                return None;
            }
            neighbor[axis] = shifted as usize;
        }
        Some(neighbor)
    }

    fn flat(&self, index: CellIndex) -> usize {
        (index[0] * self.dims[1] + index[1]) * self.dims[2] + index[2]
    }

    /// Cell containing `position`. Coordinates exactly on a cell boundary
    /// belong to the lower cell; positions outside the domain land in the
    /// first or last halo layer.
    pub fn cell_index_of(&self, position: &Vector3<f64>) -> CellIndex {
        let relative = position - self.domain_origin;
        let mut index = [0usize; 3];
        for axis in 0..self.dimensionality {
            index[axis] = if relative[axis] < 0.0 {
                0
            } else if relative[axis] >= self.domain_size[axis] {
                self.dims[axis] - 1
            } else {
                // Guard against the division rounding up to the interior
                // count for coordinates just below the domain end.
                ((relative[axis] / self.cell_size[axis]) as usize + 1).min(self.dims[axis] - 2)
            };
        }
        index
    }

    /// Re-derives the particle-to-cell assignment from current positions.
    ///
    /// Deterministic for identical positions and idempotent; also discards
    /// any ghosts staged for the previous force pass.
    pub fn rebuild(&mut self, container: &ParticleContainer) -> Result<()> {
        for cell in &mut self.cells {
            cell.particles.clear();
            cell.ghosts.clear();
        }
        self.ghost_pool.clear();
        for (i, particle) in container.iter().enumerate() {
            if particle.position.iter().any(|coordinate| !coordinate.is_finite()) {
                return Err(Error::InvalidPosition { index: i });
            }
            let index = self.cell_index_of(&particle.position);
            let flat = self.flat(index);
            self.cells[flat].particles.push(i);
        }
        Ok(())
    }

    /// Stages a ghost particle for the current force pass. The ghost must
    /// fall into a halo cell; ghosts that would land inside the domain are
    /// dropped.
    pub fn push_ghost(&mut self, ghost: Particle) {
        let index = self.cell_index_of(&ghost.position);
        let flat = self.flat(index);
        if self.cells[flat].kind != CellKind::Halo {
            warn!("dropping ghost at {:?}: not in a halo cell", ghost.position);
            return;
        }
        let ghost_index = self.ghost_pool.len();
        self.ghost_pool.push(ghost);
        self.cells[flat].ghosts.push(ghost_index);
    }

    /// Discards all staged ghosts. Called after every force pass.
    pub fn clear_ghosts(&mut self) {
        self.ghost_pool.clear();
        for cell in &mut self.cells {
            cell.ghosts.clear();
        }
    }

    pub fn cell(&self, index: CellIndex) -> &Cell {
        &self.cells[self.flat(index)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn ghosts(&self) -> &[Particle] {
        &self.ghost_pool
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn cutoff_squared(&self) -> f64 {
        self.cutoff_squared
    }

    pub fn domain_origin(&self) -> &Vector3<f64> {
        &self.domain_origin
    }

    pub fn domain_size(&self) -> &Vector3<f64> {
        &self.domain_size
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// Calls `f` for every unordered pair of real particles that the
    /// linked-cell stencil considers close enough to interact: intra-cell
    /// pairs plus pairs against the half stencil. Each pair is visited
    /// exactly once, with its container indices; the caller applies the
    /// cutoff test.
    pub fn for_each_real_pair<F>(&self, container: &mut ParticleContainer, mut f: F)
    where
        F: FnMut(usize, &mut Particle, usize, &mut Particle),
    {
        for cell in &self.cells {
            if cell.is_halo() {
                continue;
            }
            for a in 0..cell.particles.len() {
                for b in (a + 1)..cell.particles.len() {
                    let (i, j) = (cell.particles[a], cell.particles[b]);
                    let (p, q) = container.get_pair_mut(i, j);
                    f(i, p, j, q);
                }
            }
            for &neighbor_index in cell.stencil() {
                let neighbor = self.cell(neighbor_index);
                for &i in &cell.particles {
                    for &j in &neighbor.particles {
                        let (p, q) = container.get_pair_mut(i, j);
                        f(i, p, j, q);
                    }
                }
            }
        }
    }

    /// Calls `f` for every (real particle, staged ghost) pair reachable
    /// through the stencil. Ghosts are read-only; their force contribution
    /// is discarded with them.
    pub fn for_each_ghost_pair<F>(&self, container: &mut ParticleContainer, mut f: F)
    where
        F: FnMut(&mut Particle, &Particle),
    {
        for cell in &self.cells {
            if cell.is_halo() {
                continue;
            }
            for &neighbor_index in cell.stencil() {
                let neighbor = self.cell(neighbor_index);
                if neighbor.ghosts.is_empty() {
                    continue;
                }
                for &i in &cell.particles {
                    let particle = &mut container.particles[i];
                    for &g in &neighbor.ghosts {
                        f(particle, &self.ghost_pool[g]);
                    }
                }
            }
        }
    }
}
