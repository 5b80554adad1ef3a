/*
 * Application Module
 *
 * This module defines the viewer's model and per-frame update for the swarm.
 * Each frame the UI edits a working copy of the parameters, the edits are
 * pushed into the simulation, and the simulation is advanced by the frame's
 * elapsed time in fixed steps.
 */

use std::time::Duration;

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{debug, warn};

use crate::params::SimulationParams;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui;

// Frame timing shown in the control panel
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_time: Duration,
    pub steps_last_frame: usize,
}

// Display toggles that do not affect the simulation
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions {
    pub show_grid: bool,
    pub show_aggregates: bool,
}

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    // Working copy edited by the UI
    pub params: SimulationParams,
    pub view: ViewOptions,
    pub egui: Egui,
    pub stats: FrameStats,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Boid Swarm")
        .size(960, 960)
        .view(renderer::view)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to open the viewer window");

    let window = app.window(window_id).expect("viewer window closed during startup");
    let egui = Egui::from_window(&window);

    let params = SimulationParams::default();
    let simulation = Simulation::new(params.clone()).expect("default parameters are valid");

    Model {
        simulation,
        params,
        view: ViewOptions::default(),
        egui,
        stats: FrameStats::default(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.stats.fps = app.fps();
    model.stats.frame_time = update.since_last;

    let response = ui::update_ui(
        &mut model.egui,
        &mut model.params,
        &mut model.view,
        &model.stats,
        model.simulation.last_report(),
    );
    apply_changes(model, response);

    model.stats.steps_last_frame = model.simulation.advance(update.since_last);
}

// Push UI edits into the running simulation
fn apply_changes(model: &mut Model, response: ui::UiResponse) {
    let changes = response.changes;

    if changes.rules {
        *model.simulation.rules_mut() = model.params.rules;
        debug!("rules updated from the control panel");
    }
    if changes.paused {
        model.simulation.set_paused(model.params.paused);
    }
    if changes.population || response.reset_requested {
        if let Err(err) = model.simulation.set_population(model.params.population) {
            warn!(%err, "failed to repopulate the swarm");
        }
    }
}

// Handle raw window events for egui
fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
