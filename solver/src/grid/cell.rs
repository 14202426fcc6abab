/// Index of a cell within the grid, including the halo layers.
pub type CellIndex = [usize; 3];

/// Role of a cell within the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Strictly inside the domain, at least one cell away from every face.
    Inner,
    /// Inside the domain but adjacent to at least one face. Boundary
    /// handlers read these cells to stage halo state.
    Boundary,
    /// Outside the domain. Holds only transient ghost particles during a
    /// force pass.
    Halo,
}

/// A bucket of particle references covering one grid subvolume.
///
/// Cells never own particles: `particles` holds indices into the
/// [`ParticleContainer`], `ghosts` holds indices into the grid's ghost
/// pool. The precomputed `stencil` lists the neighbor cells this cell is
/// paired against, chosen so that every cutoff-reachable unordered pair is
/// enumerated exactly once system-wide.
///
/// [`ParticleContainer`]: molsim_core::ParticleContainer
#[derive(Clone, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub index: CellIndex,
    /// Container indices of the real particles currently in this cell.
    pub particles: Vec<usize>,
    /// Ghost-pool indices, only ever non-empty for halo cells.
    pub ghosts: Vec<usize>,
    /// Half stencil of neighbor cells, plus adjacent halo cells that the
    /// half stencil misses.
    pub(crate) stencil: Vec<CellIndex>,
}

impl Cell {
    pub(crate) fn new(kind: CellKind, index: CellIndex) -> Self {
        Cell {
            kind,
            index,
            particles: vec![],
            ghosts: vec![],
            stencil: vec![],
        }
    }

    pub fn is_halo(&self) -> bool {
        self.kind == CellKind::Halo
    }

    /// Neighbor cells this cell is paired against during force passes.
    pub fn stencil(&self) -> &[CellIndex] {
        &self.stencil
    }
}
