mod cuboid;
mod membrane;
mod sphere;
mod velocity;

pub use cuboid::*;
pub use membrane::*;
pub use sphere::*;
pub use velocity::*;
