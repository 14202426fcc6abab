use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while setting up or advancing a
/// simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The force cutoff radius must be a positive finite number.
    #[error("invalid cutoff radius {0}")]
    InvalidCutoff(f64),
    /// The domain extents or origin are unusable.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    /// A periodic face whose opposite face is not periodic.
    #[error("periodic face {0} has a non-periodic opposite face")]
    UnpairedPeriodicFace(&'static str),
    /// A particle type without interaction parameters.
    #[error("no interaction parameters for particle type {0}")]
    MissingTypeParameters(u16),
    /// The membrane force model was selected without membrane parameters.
    #[error("membrane force model requires membrane parameters")]
    MissingMembraneParameters,
    /// A particle position became non-finite.
    #[error("particle {index} has a non-finite position")]
    InvalidPosition { index: usize },
    /// A particle could not be mapped to any cell.
    #[error("particle {index} is lost to the spatial index")]
    ParticleLost { index: usize },
    /// A force evaluation produced non-finite values.
    #[error("non-finite forces on particles {indices:?}")]
    NonFiniteForce { indices: Vec<usize> },
}
