mod face;
mod handler;

pub use face::*;
pub use handler::*;
