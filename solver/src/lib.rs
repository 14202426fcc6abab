//! Particle dynamics solver: linked-cell spatial indexing, pairwise force
//! kernels, boundary conditions and time integration over the particle
//! model from `molsim_core`.

extern crate nalgebra as na;

pub mod boundary;
pub mod forces;
pub mod grid;
pub mod initializer;
pub mod simulation;
