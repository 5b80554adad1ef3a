/*
 * Error Module
 *
 * Errors are only produced while building things: parameters, samplers,
 * the grid and the worker pool. A running tick never returns an error;
 * broken invariants inside a tick panic instead.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    // Configuration values that cannot be used (e.g. a grid with one cell per axis)
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("invalid sampler range on the {axis} axis: [{low}, {high})")]
    InvalidRange { axis: &'static str, low: f32, high: f32 },

    #[error("failed to start worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
