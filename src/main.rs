/*
 * Boid Swarm Simulation - Headless Runner
 *
 * Builds a session from the command line, runs a fixed number of ticks
 * without a window and logs how the swarm behaved. Useful for profiling
 * the force pass and for checking seeded runs.
 *
 * Log output is controlled with RUST_LOG, e.g. `RUST_LOG=boids=debug`.
 */

use std::time::Instant;

use anyhow::{Context, Result};
use boids::vector::{average, magnitude};
use boids::{RuleKind, Simulation, SimulationParams};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "boids", version, about = "Run the boid swarm without a window")]
struct Cli {
    /// Number of agents to simulate.
    #[arg(long, short = 'n', default_value_t = 1000)]
    population: usize,

    /// Number of fixed steps to run.
    #[arg(long, short = 't', default_value_t = 600)]
    ticks: u64,

    /// Grid cells along each side of the domain.
    #[arg(long, default_value_t = 16)]
    nodes_per_axis: usize,

    /// Worker threads for the force pass (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for a reproducible population.
    #[arg(long)]
    seed: Option<u64>,

    /// Turn gravity on.
    #[arg(long)]
    gravity: bool,

    /// Turn random noise on.
    #[arg(long)]
    noise: bool,
}

impl Cli {
    fn params(&self) -> SimulationParams {
        let mut params = SimulationParams::default();
        params.population = self.population;
        params.nodes_per_axis = self.nodes_per_axis;
        params.workers = self.workers;
        params.seed = self.seed;
        params.rules[RuleKind::Gravity].enabled = self.gravity;
        params.rules[RuleKind::RandomNoise].enabled = self.noise;
        params
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut sim = Simulation::new(cli.params()).context("failed to build simulation")?;
    for (kind, setting) in sim.rules().iter() {
        info!(rule = %kind, enabled = setting.enabled, magnitude = setting.magnitude, "rule");
    }

    let started = Instant::now();
    let mut rescued = 0;
    let mut neighbor_weight = 0.0_f64;
    for _ in 0..cli.ticks {
        let report = sim.step();
        rescued += report.rescued;
        neighbor_weight += f64::from(report.mean_neighbor_weight);
    }
    let elapsed = started.elapsed();

    let flock = sim.flock();
    let positions = flock.positions();
    let speeds: Vec<f32> = flock.velocities().iter().map(|&v| magnitude(v)).collect();
    let mean_speed = if speeds.is_empty() {
        0.0
    } else {
        speeds.iter().sum::<f32>() / speeds.len() as f32
    };
    let max_speed = speeds.iter().copied().fold(0.0_f32, f32::max);

    let ticks_per_second = if elapsed.as_secs_f64() > 0.0 {
        sim.ticks() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    info!(
        ticks = sim.ticks(),
        population = flock.population(),
        workers = flock.worker_count(),
        elapsed_ms = elapsed.as_millis() as u64,
        ticks_per_second,
        "run finished"
    );
    info!(
        centroid = %average(positions),
        mean_speed,
        max_speed,
        mean_neighbor_weight = neighbor_weight / cli.ticks.max(1) as f64,
        rescued,
        "swarm summary"
    );

    Ok(())
}
