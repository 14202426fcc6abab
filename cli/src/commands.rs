use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use molsim_core::ParticleContainer;
use molsim_solver::initializer::{CuboidCluster, MembraneSheet, SphereCluster};
use molsim_solver::simulation::{Simulation, Thermostat};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::args::{Args, Command};

/// A complete simulation setup as read from a scenario file.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub config: molsim_solver::simulation::SimulationConfig,
    #[serde(default)]
    pub cuboids: Vec<CuboidCluster>,
    #[serde(default)]
    pub spheres: Vec<SphereCluster>,
    #[serde(default)]
    pub membranes: Vec<MembraneSheet>,
    #[serde(default)]
    pub thermostat: Thermostat,
    /// Steps between thermostat applications.
    #[serde(default = "default_thermostat_every")]
    pub thermostat_every: usize,
    /// Seed for the thermal velocity sampling.
    #[serde(default)]
    pub seed: u64,
}

fn default_thermostat_every() -> usize {
    1000
}

pub fn dispatch(args: Args) -> Result<(), Box<dyn Error>> {
    match args.command {
        Command::Run {
            scenario,
            steps,
            delta_time,
            out_file,
            output_every,
        } => run(&scenario, steps, delta_time, out_file, output_every),
        Command::Check { scenario } => check(&scenario),
    }
}

fn load_scenario(path: &Path) -> Result<Scenario, Box<dyn Error>> {
    let file = File::open(path)?;
    let scenario: Scenario = serde_json::from_reader(file)?;
    scenario.config.validate()?;
    Ok(scenario)
}

fn build_simulation(scenario: &Scenario) -> Result<Simulation, Box<dyn Error>> {
    let dimensionality = if scenario.config.domain_size[2] == 0.0 {
        2
    } else {
        3
    };
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let mut container = ParticleContainer::new();
    for cuboid in &scenario.cuboids {
        cuboid.generate(&mut container, dimensionality, &mut rng);
    }
    for sphere in &scenario.spheres {
        sphere.generate(&mut container, dimensionality, &mut rng);
    }
    let membranes: Vec<_> = scenario
        .membranes
        .iter()
        .map(|sheet| sheet.generate(&mut container))
        .collect();

    let mut simulation = Simulation::new(&scenario.config, container)?;
    for membrane in membranes {
        simulation.add_membrane(membrane);
    }
    Ok(simulation)
}

fn check(path: &Path) -> Result<(), Box<dyn Error>> {
    let scenario = load_scenario(path)?;
    let simulation = build_simulation(&scenario)?;
    println!(
        "scenario ok: {} particles, {:?} force model",
        simulation.container.len(),
        scenario.config.force_model
    );
    Ok(())
}

fn run(
    path: &Path,
    steps: usize,
    delta_time: f64,
    out_file: Option<PathBuf>,
    output_every: usize,
) -> Result<(), Box<dyn Error>> {
    let scenario = load_scenario(path)?;
    let mut simulation = build_simulation(&scenario)?;
    let dimensionality = simulation.grid().dimensionality();
    info!(
        "running {} steps of {} with {} particles",
        steps,
        delta_time,
        simulation.container.len()
    );

    let mut writer = match out_file {
        Some(path) => Some(TrajectoryWriter::create(&path)?),
        None => None,
    };
    simulation.initialize_forces()?;
    if let Some(writer) = &mut writer {
        writer.write_frame(0, &simulation.container)?;
    }

    let progress = ProgressBar::new(steps as u64);
    progress.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40} {pos}/{len} steps",
    )?);
    for step in 1..=steps {
        simulation.step(delta_time)?;
        if scenario.thermostat_every > 0 && step % scenario.thermostat_every == 0 {
            scenario
                .thermostat
                .apply(&mut simulation.container, dimensionality);
        }
        if output_every > 0 && step % output_every == 0 {
            if let Some(writer) = &mut writer {
                writer.write_frame(step, &simulation.container)?;
            }
        }
        progress.inc(1);
    }
    progress.finish();
    info!(
        "finished with {} particles in the domain",
        simulation.container.len()
    );
    Ok(())
}

/// Writes trajectory frames as flat CSV rows, one particle per row.
struct TrajectoryWriter {
    writer: csv::Writer<File>,
}

impl TrajectoryWriter {
    fn create(path: &Path) -> Result<Self, Box<dyn Error>> {
        let mut writer = csv::Writer::from_writer(File::create(path)?);
        writer.write_record([
            "step", "id", "type", "x", "y", "z", "vx", "vy", "vz",
        ])?;
        Ok(TrajectoryWriter { writer })
    }

    fn write_frame(
        &mut self,
        step: usize,
        container: &ParticleContainer,
    ) -> Result<(), Box<dyn Error>> {
        for (id, particle) in container.iter().enumerate() {
            self.writer.write_record([
                step.to_string(),
                id.to_string(),
                particle.type_id.to_string(),
                particle.position.x.to_string(),
                particle.position.y.to_string(),
                particle.position.z.to_string(),
                particle.velocity.x.to_string(),
                particle.velocity.y.to_string(),
                particle.velocity.z.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
