mod cell;
mod grid;

pub use cell::*;
pub use grid::*;
