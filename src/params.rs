/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that holds everything a
 * session needs to build its domain, grid, worker pool and population.
 * The rule table lives here too so one value fully describes a run.
 *
 * The viewer edits these fields directly; a snapshot taken before the UI
 * pass lets it find out afterwards which edits need a population reset.
 */

use std::ops::RangeInclusive;

use crate::domain::DEFAULT_SPAN;
use crate::error::SwarmError;
use crate::rules::Rules;
use crate::spatial_grid::{DEFAULT_COARSE_RADIUS, DEFAULT_FINE_RADIUS, DEFAULT_NODES_PER_AXIS};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub population: usize,
    pub span: f32,
    pub nodes_per_axis: usize,
    // Neighbor tiers, in cells (Chebyshev distance)
    pub fine_radius: usize,
    pub coarse_radius: usize,
    // None uses the host's available parallelism
    pub workers: Option<usize>,
    // Fixed simulation steps per second
    pub tick_rate: f32,
    pub max_steps_per_advance: usize,
    pub seed: Option<u64>,
    pub paused: bool,
    pub rules: Rules,

    // Values seen before the last UI pass
    snapshot: Option<ParamSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamSnapshot {
    population: usize,
    rules: Rules,
    paused: bool,
}

// What changed since the last snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub population: bool,
    pub rules: bool,
    pub paused: bool,
}

impl ParamChanges {
    pub fn any(&self) -> bool {
        self.population || self.rules || self.paused
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            population: 1000,
            span: DEFAULT_SPAN,
            nodes_per_axis: DEFAULT_NODES_PER_AXIS,
            fine_radius: DEFAULT_FINE_RADIUS,
            coarse_radius: DEFAULT_COARSE_RADIUS,
            workers: None,
            tick_rate: 60.0,
            max_steps_per_advance: 8,
            seed: None,
            paused: false,
            rules: Rules::default(),
            snapshot: None,
        }
    }
}

impl SimulationParams {
    // Reject shapes the grid, pool or clock cannot work with
    pub fn validate(&self) -> Result<(), SwarmError> {
        if !self.span.is_finite() || self.span <= 0.0 {
            return Err(SwarmError::InvalidConfig("span must be finite and positive"));
        }
        if self.nodes_per_axis < 2 {
            return Err(SwarmError::InvalidConfig("grid needs at least 2 nodes per axis"));
        }
        if self.coarse_radius <= self.fine_radius {
            return Err(SwarmError::InvalidConfig("coarse radius must exceed fine radius"));
        }
        if self.workers == Some(0) {
            return Err(SwarmError::InvalidConfig("worker count must be at least 1"));
        }
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            return Err(SwarmError::InvalidConfig("tick rate must be finite and positive"));
        }
        if self.max_steps_per_advance == 0 {
            return Err(SwarmError::InvalidConfig("max steps per advance must be at least 1"));
        }
        Ok(())
    }

    // Seconds covered by one fixed step
    #[inline]
    pub fn step_seconds(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn take_snapshot(&mut self) {
        self.snapshot = Some(ParamSnapshot {
            population: self.population,
            rules: self.rules,
            paused: self.paused,
        });
    }

    // Compare against the last snapshot; nothing counts as changed without one
    pub fn detect_changes(&self) -> ParamChanges {
        match &self.snapshot {
            Some(prev) => ParamChanges {
                population: self.population != prev.population,
                rules: self.rules != prev.rules,
                paused: self.paused != prev.paused,
            },
            None => ParamChanges::default(),
        }
    }

    // Slider ranges for the viewer
    pub fn population_range() -> RangeInclusive<usize> {
        0..=20_000
    }

    pub fn magnitude_range() -> RangeInclusive<f32> {
        0.0..=100.0
    }

    pub fn confine_range() -> RangeInclusive<f32> {
        0.0..=1e6
    }

    pub fn clamp_range() -> RangeInclusive<f32> {
        1.0..=500.0
    }
}
