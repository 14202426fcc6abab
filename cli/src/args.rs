use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "molsim", version, about = "Particle dynamics simulator")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scenario file and write the trajectory.
    Run {
        /// Path to the scenario file (JSON).
        scenario: PathBuf,
        /// Number of time steps to simulate.
        #[arg(short, long, default_value_t = 1000)]
        steps: usize,
        /// Length of one time step.
        #[arg(short, long, default_value_t = 0.0005)]
        delta_time: f64,
        /// Trajectory output file (CSV). No output when omitted.
        #[arg(short, long)]
        out_file: Option<PathBuf>,
        /// Write a trajectory frame every this many steps.
        #[arg(long, default_value_t = 10)]
        output_every: usize,
    },
    /// Parse and validate a scenario file without running it.
    Check {
        /// Path to the scenario file (JSON).
        scenario: PathBuf,
    },
}
