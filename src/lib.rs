/*
 * Boid Swarm Simulation - Module Definitions
 *
 * This file defines the module structure for the swarm simulation.
 * The core (grid, rules, flock, session) has no display dependency; the
 * interactive viewer modules only exist with the `viewer` feature.
 */

// Re-export key components for easier access
pub use domain::Domain;
pub use error::SwarmError;
pub use flock::{Flock, TickReport};
pub use params::SimulationParams;
pub use rules::{RuleKind, RuleSetting, Rules};
pub use sampler::{Sampler, UniformSampler};
pub use simulation::Simulation;
pub use spatial_grid::{PseudoBoid, SpatialGrid};
pub use vector::Vector2;

// Define modules
pub mod domain;
pub mod error;
pub mod flock;
pub mod params;
pub mod partition;
pub mod rules;
pub mod sampler;
pub mod simulation;
pub mod spatial_grid;
pub mod vector;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;
