/*
 * Flock Module
 *
 * This module owns the agent population and advances it one tick at a time.
 * State is kept as parallel arrays (positions, velocities and one delta
 * array per rule) so the force pass can hand each worker a disjoint slice.
 *
 * A tick runs in four steps:
 * 1. Rebuild the spatial grid from the current positions and velocities
 * 2. Split 0..population into one contiguous chunk per worker
 * 3. Compute every agent's rule deltas in parallel; each chunk only writes
 *    its own slots, so no locking is needed. The rayon scope joins every
 *    chunk before returning.
 * 4. Integrate serially: sum the enabled deltas, clamp, move, and return
 *    any agent that left the domain to its centre
 *
 * The worker pool is created once and reused for every tick.
 */

use std::num::NonZeroUsize;
use std::ops::Range;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, trace};

use crate::domain::{Domain, RESCUE_VELOCITY};
use crate::error::SwarmError;
use crate::partition::partition;
use crate::rules::{RuleKind, Rules};
use crate::sampler::Sampler;
use crate::spatial_grid::{PseudoBoid, SpatialGrid};
use crate::vector::{clamp, distance_squared, Vector2};

// Neighbors closer than this (squared) add nothing to the density term
pub const SEPARATION_EPSILON: f32 = 1e-7;

// Smallest wall distance used by the confinement potential
pub const WALL_DISTANCE_FLOOR: f32 = 1e-6;

// Per-agent output of the neighbor pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgentDeltas {
    pub center_of_mass: Vector2,
    pub alignment: Vector2,
    pub density: Vector2,
    // Total weight of the neighbors, self excluded
    pub neighbor_weight: f32,
}

// Summary of a finished tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub population: usize,
    pub rescued: usize,
    pub mean_neighbor_weight: f32,
}

// Compute the neighbor-driven deltas for one agent.
//
// `neighbors` is expected to contain the agent itself as a weight-1 entry
// (the fine tier always includes the owning cell). Rather than checking
// every neighbor against self, the sums start with self already subtracted.
pub fn neighbor_deltas(
    position: Vector2,
    velocity: Vector2,
    neighbors: &[PseudoBoid],
    rules: &Rules,
) -> AgentDeltas {
    let mut position_sum = -position;
    let mut velocity_sum = -velocity;
    let mut weight_sum = -1.0_f32;
    let mut density = Vector2::ZERO;

    for neighbor in neighbors {
        position_sum += neighbor.weight * neighbor.position;
        velocity_sum += neighbor.weight * neighbor.velocity;
        weight_sum += neighbor.weight;

        let separation = distance_squared(position, neighbor.position);
        if separation > SEPARATION_EPSILON {
            density += (neighbor.weight / separation) * (position - neighbor.position);
        }
    }

    if weight_sum <= 0.0 {
        return AgentDeltas::default();
    }

    let inverted_weight_sum = 1.0 / weight_sum;
    let average_position = position_sum * inverted_weight_sum;
    let average_velocity = velocity_sum * inverted_weight_sum;

    AgentDeltas {
        center_of_mass: rules
            .active(RuleKind::CenterOfMass)
            .map_or(Vector2::ZERO, |m| m * (average_position - position)),
        alignment: rules
            .active(RuleKind::AverageVelocity)
            .map_or(Vector2::ZERO, |m| m * average_velocity),
        density: rules
            .active(RuleKind::Density)
            .map_or(Vector2::ZERO, |m| m * density),
        neighbor_weight: weight_sum,
    }
}

// Quartic wall repulsion pushing away from all four sides of the domain
pub fn confine_delta(position: Vector2, span: f32, coefficient: f32) -> Vector2 {
    let inverse_quartic = |d: f32| 1.0 / d.abs().max(WALL_DISTANCE_FLOOR).powi(4);

    let x = inverse_quartic(position.x) - inverse_quartic(position.x - span);
    let y = inverse_quartic(position.y) - inverse_quartic(position.y - span);

    coefficient * Vector2::new(x, y)
}

// One delta array per rule kind that the neighbor pass writes
#[derive(Debug, Default)]
struct RuleDeltas {
    center_of_mass: Vec<Vector2>,
    alignment: Vec<Vector2>,
    density: Vec<Vector2>,
    confine: Vec<Vector2>,
}

impl RuleDeltas {
    fn reset(&mut self, count: usize) {
        for deltas in [
            &mut self.center_of_mass,
            &mut self.alignment,
            &mut self.density,
            &mut self.confine,
        ] {
            deltas.clear();
            deltas.resize(count, Vector2::ZERO);
        }
    }

    fn has_len(&self, count: usize) -> bool {
        self.center_of_mass.len() == count
            && self.alignment.len() == count
            && self.density.len() == count
            && self.confine.len() == count
    }

    // Hand out one disjoint window of every array per range. The ranges
    // must be contiguous and start at 0, as produced by `partition`.
    fn chunks_mut(&mut self, ranges: &[Range<usize>]) -> Vec<DeltaChunk<'_>> {
        let mut center_of_mass = self.center_of_mass.as_mut_slice();
        let mut alignment = self.alignment.as_mut_slice();
        let mut density = self.density.as_mut_slice();
        let mut confine = self.confine.as_mut_slice();

        let mut chunks = Vec::with_capacity(ranges.len());
        for range in ranges {
            let len = range.len();

            let (head, tail) = std::mem::take(&mut center_of_mass).split_at_mut(len);
            center_of_mass = tail;
            let center_of_mass_head = head;

            let (head, tail) = std::mem::take(&mut alignment).split_at_mut(len);
            alignment = tail;
            let alignment_head = head;

            let (head, tail) = std::mem::take(&mut density).split_at_mut(len);
            density = tail;
            let density_head = head;

            let (head, tail) = std::mem::take(&mut confine).split_at_mut(len);
            confine = tail;

            chunks.push(DeltaChunk {
                start: range.start,
                center_of_mass: center_of_mass_head,
                alignment: alignment_head,
                density: density_head,
                confine: head,
            });
        }
        chunks
    }

    // Sum of the enabled rules' deltas for agent `i`
    #[inline]
    fn total(&self, i: usize, rules: &Rules) -> Vector2 {
        let mut dv = Vector2::ZERO;

        // Apply only the rules that have been turned on
        if rules.is_enabled(RuleKind::AverageVelocity) {
            dv += self.alignment[i];
        }
        if rules.is_enabled(RuleKind::Confine) {
            dv += self.confine[i];
        }
        if rules.is_enabled(RuleKind::Density) {
            dv += self.density[i];
        }
        if rules.is_enabled(RuleKind::CenterOfMass) {
            dv += self.center_of_mass[i];
        }
        dv
    }
}

// The slots a single worker owns during the force pass
struct DeltaChunk<'a> {
    start: usize,
    center_of_mass: &'a mut [Vector2],
    alignment: &'a mut [Vector2],
    density: &'a mut [Vector2],
    confine: &'a mut [Vector2],
}

impl DeltaChunk<'_> {
    fn fill(
        self,
        positions: &[Vector2],
        velocities: &[Vector2],
        grid: &SpatialGrid,
        rules: &Rules,
        scratch: &mut WorkerScratch,
    ) {
        let DeltaChunk {
            start,
            center_of_mass,
            alignment,
            density,
            confine,
        } = self;

        let confine_coefficient = rules.active(RuleKind::Confine);
        let span = grid.domain().span();
        scratch.neighbor_weight = 0.0;

        for local in 0..center_of_mass.len() {
            let i = start + local;
            let position = positions[i];

            grid.get_neighbors(position, &mut scratch.neighbors);
            let deltas = neighbor_deltas(position, velocities[i], &scratch.neighbors, rules);

            center_of_mass[local] = deltas.center_of_mass;
            alignment[local] = deltas.alignment;
            density[local] = deltas.density;
            confine[local] = confine_coefficient
                .map_or(Vector2::ZERO, |c| confine_delta(position, span, c));

            scratch.neighbor_weight += f64::from(deltas.neighbor_weight);
        }
    }
}

// Per-worker state kept between ticks so queries do not reallocate
#[derive(Debug, Default)]
struct WorkerScratch {
    neighbors: Vec<PseudoBoid>,
    neighbor_weight: f64,
}

#[derive(Debug)]
pub struct Flock {
    positions: Vec<Vector2>,
    velocities: Vec<Vector2>,
    deltas: RuleDeltas,
    count: usize,
    pool: ThreadPool,
    scratch: Vec<WorkerScratch>,
    noise_rng: StdRng,
}

impl Flock {
    // Create a flock whose worker pool matches the host's parallelism
    pub fn new<P, V>(
        count: usize,
        position_sampler: &mut P,
        velocity_sampler: &mut V,
    ) -> Result<Self, SwarmError>
    where
        P: Sampler + ?Sized,
        V: Sampler + ?Sized,
    {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_workers(count, position_sampler, velocity_sampler, workers)
    }

    pub fn with_workers<P, V>(
        count: usize,
        position_sampler: &mut P,
        velocity_sampler: &mut V,
        workers: usize,
    ) -> Result<Self, SwarmError>
    where
        P: Sampler + ?Sized,
        V: Sampler + ?Sized,
    {
        if workers == 0 {
            return Err(SwarmError::InvalidConfig("worker pool needs at least one thread"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("flock-worker-{i}"))
            .build()?;
        info!(workers, "flock worker pool started");

        let mut flock = Self {
            positions: Vec::new(),
            velocities: Vec::new(),
            deltas: RuleDeltas::default(),
            count: 0,
            pool,
            scratch: (0..workers).map(|_| WorkerScratch::default()).collect(),
            noise_rng: StdRng::from_entropy(),
        };
        flock.reset(count, position_sampler, velocity_sampler);
        Ok(flock)
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn positions(&self) -> &[Vector2] {
        &self.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vector2] {
        &self.velocities
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.scratch.len()
    }

    // Make the random noise rule reproducible
    pub fn reseed_noise(&mut self, seed: u64) {
        self.noise_rng = StdRng::seed_from_u64(seed);
    }

    // Replace the whole population with fresh samples
    pub fn reset<P, V>(&mut self, count: usize, position_sampler: &mut P, velocity_sampler: &mut V)
    where
        P: Sampler + ?Sized,
        V: Sampler + ?Sized,
    {
        self.positions.clear();
        self.velocities.clear();
        self.positions.reserve(count);
        self.velocities.reserve(count);

        for _ in 0..count {
            self.positions.push(position_sampler.sample());
            self.velocities.push(velocity_sampler.sample());
        }

        self.deltas.reset(count);
        self.count = count;
        debug!(population = count, "flock reset");
    }

    // Advance every agent by `dt`
    pub fn update(&mut self, dt: f32, rules: &Rules, grid: &mut SpatialGrid) -> TickReport {
        debug_assert!(dt.is_finite() && dt >= 0.0, "time step must be finite and non-negative");
        assert!(
            self.positions.len() == self.count
                && self.velocities.len() == self.count
                && self.deltas.has_len(self.count),
            "agent arrays out of sync with population {}",
            self.count
        );

        grid.rebuild(&self.positions, &self.velocities);

        if self.count == 0 {
            return TickReport::default();
        }

        let neighbor_weight = self.accumulate(rules, grid);
        let rescued = self.integrate(dt, rules, *grid.domain());

        if rescued > 0 {
            debug!(rescued, "agents left the domain and were returned to its centre");
        }

        let report = TickReport {
            population: self.count,
            rescued,
            mean_neighbor_weight: (neighbor_weight / self.count as f64) as f32,
        };
        trace!(?report, "tick complete");
        report
    }

    // Parallel neighbor pass; returns the summed neighbor weight
    fn accumulate(&mut self, rules: &Rules, grid: &SpatialGrid) -> f64 {
        let ranges = partition(self.count, self.scratch.len());
        let positions = self.positions.as_slice();
        let velocities = self.velocities.as_slice();
        let chunks = self.deltas.chunks_mut(&ranges);
        let scratch = &mut self.scratch;

        // Returns once every chunk has finished writing
        self.pool.scope(|scope| {
            for (chunk, scratch) in chunks.into_iter().zip(scratch.iter_mut()) {
                scope.spawn(move |_| chunk.fill(positions, velocities, grid, rules, scratch));
            }
        });

        self.scratch.iter().map(|s| s.neighbor_weight).sum()
    }

    // Serial pass; returns the number of rescued agents
    fn integrate(&mut self, dt: f32, rules: &Rules, domain: Domain) -> usize {
        let max_force = rules.max_force();
        let max_velocity = rules.max_velocity();
        let gravity = rules.active(RuleKind::Gravity);
        let noise = rules.active(RuleKind::RandomNoise);
        let unit = Uniform::new(-1.0_f32, 1.0);

        let mut rescued = 0;
        for i in 0..self.count {
            let mut dv = self.deltas.total(i, rules);

            if let Some(magnitude) = noise {
                let jitter = Vector2::new(
                    unit.sample(&mut self.noise_rng),
                    unit.sample(&mut self.noise_rng),
                );
                dv += magnitude * jitter;
            }
            if let Some(magnitude) = gravity {
                dv.y -= magnitude * dt;
            }

            let dv = clamp(dv, max_force);
            let velocity = clamp(self.velocities[i] + dv, max_velocity);
            let position = self.positions[i] + dt * velocity;

            if domain.contains(position) {
                self.positions[i] = position;
                self.velocities[i] = velocity;
            } else {
                self.positions[i] = domain.rescue_point();
                self.velocities[i] = RESCUE_VELOCITY;
                rescued += 1;
            }
        }
        rescued
    }
}
