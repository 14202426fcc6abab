mod config;
mod integrator;
mod simulation;
mod thermostat;

pub use config::*;
pub use integrator::*;
pub use simulation::*;
pub use thermostat::*;
