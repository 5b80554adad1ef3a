/*
 * Boid Swarm Simulation - Interactive Viewer
 *
 * Opens a window showing the swarm with a control panel for every rule.
 * Built only with the `viewer` feature:
 *
 *     cargo run --release --features viewer --bin boids-viewer
 */

use boids::app::{model, update};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() {
    init_tracing();
    nannou::app(model).update(update).run();
}
