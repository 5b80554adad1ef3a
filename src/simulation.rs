/*
 * Simulation Module
 *
 * A Simulation ties one flock to its grid and parameters and drives it with
 * a fixed time step. Callers either step it directly or hand it wall-clock
 * time through `advance`, which runs as many whole steps as fit.
 *
 * Rule edits go through `&mut Simulation`, so they can never overlap a tick.
 */

use std::time::Duration;

use tracing::{debug, info};

use crate::domain::Domain;
use crate::error::SwarmError;
use crate::flock::{Flock, TickReport};
use crate::params::SimulationParams;
use crate::rules::Rules;
use crate::sampler::{Sampler, UniformSampler};
use crate::spatial_grid::SpatialGrid;

// Initial speed range per axis for the default velocity sampler
pub const INITIAL_VELOCITY_LOW: f32 = 0.5;
pub const INITIAL_VELOCITY_HIGH: f32 = 50.0;

#[derive(Debug)]
pub struct Simulation {
    params: SimulationParams,
    grid: SpatialGrid,
    flock: Flock,
    accumulator: Duration,
    ticks: u64,
    last_report: TickReport,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Result<Self, SwarmError> {
        params.validate()?;

        let domain = Domain::new(params.span)?;
        let grid = SpatialGrid::with_tiers(
            domain,
            params.nodes_per_axis,
            params.fine_radius,
            params.coarse_radius,
        )?;

        let (mut positions, mut velocities) = default_samplers(&domain, params.seed)?;
        let mut flock = match params.workers {
            Some(workers) => {
                Flock::with_workers(params.population, &mut positions, &mut velocities, workers)?
            }
            None => Flock::new(params.population, &mut positions, &mut velocities)?,
        };
        if let Some(seed) = params.seed {
            flock.reseed_noise(seed);
        }

        info!(
            population = params.population,
            span = params.span,
            nodes_per_axis = params.nodes_per_axis,
            workers = flock.worker_count(),
            "simulation ready"
        );

        Ok(Self {
            params,
            grid,
            flock,
            accumulator: Duration::ZERO,
            ticks: 0,
            last_report: TickReport::default(),
        })
    }

    // Run exactly one fixed step, ignoring the pause flag
    pub fn step(&mut self) -> TickReport {
        let dt = self.params.step_seconds();
        let report = self.flock.update(dt, &self.params.rules, &mut self.grid);
        self.ticks += 1;
        self.last_report = report;
        report
    }

    // Feed elapsed wall-clock time and run the whole steps it covers.
    // Returns the number of steps run.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        if self.params.paused {
            return 0;
        }

        self.accumulator += elapsed;
        let step = self.step_duration();

        let mut steps = 0;
        while self.accumulator >= step {
            if steps == self.params.max_steps_per_advance {
                debug!(
                    dropped = ?self.accumulator,
                    "simulation fell behind, dropping surplus time"
                );
                self.accumulator = Duration::ZERO;
                break;
            }
            self.step();
            self.accumulator -= step;
            steps += 1;
        }
        steps
    }

    // Repopulate with the configured population and default samplers
    pub fn reset(&mut self) -> Result<(), SwarmError> {
        let (mut positions, mut velocities) =
            default_samplers(self.grid.domain(), self.params.seed)?;
        self.reset_with(self.params.population, &mut positions, &mut velocities);
        if let Some(seed) = self.params.seed {
            self.flock.reseed_noise(seed);
        }
        Ok(())
    }

    pub fn reset_with<P, V>(
        &mut self,
        count: usize,
        position_sampler: &mut P,
        velocity_sampler: &mut V,
    ) where
        P: Sampler + ?Sized,
        V: Sampler + ?Sized,
    {
        self.params.population = count;
        self.flock.reset(count, position_sampler, velocity_sampler);
        self.accumulator = Duration::ZERO;
        self.last_report = TickReport::default();
    }

    // Change the population size and repopulate
    pub fn set_population(&mut self, count: usize) -> Result<(), SwarmError> {
        self.params.population = count;
        self.reset()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.params.paused = paused;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.params.paused
    }

    pub fn step_duration(&self) -> Duration {
        Duration::from_secs_f32(self.params.step_seconds())
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.params.rules
    }

    #[inline]
    pub fn rules_mut(&mut self) -> &mut Rules {
        &mut self.params.rules
    }

    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    #[inline]
    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn last_report(&self) -> TickReport {
        self.last_report
    }
}

// Positions across the domain interior, velocities in the initial speed box.
// With a seed, both streams are reproducible and independent of each other.
fn default_samplers(
    domain: &Domain,
    seed: Option<u64>,
) -> Result<(UniformSampler, UniformSampler), SwarmError> {
    let velocity_range = INITIAL_VELOCITY_LOW..INITIAL_VELOCITY_HIGH;
    match seed {
        Some(seed) => Ok((
            UniformSampler::domain_interior_seeded(domain, seed)?,
            UniformSampler::seeded(velocity_range.clone(), velocity_range, seed.wrapping_add(1))?,
        )),
        None => Ok((
            UniformSampler::domain_interior(domain)?,
            UniformSampler::new(velocity_range.clone(), velocity_range)?,
        )),
    }
}
