/*
 * UI Module
 *
 * This module builds the control panel with nannou_egui. Every rule gets a
 * toggle and a magnitude slider; the population can be resized or
 * resampled. Change detection is handled by SimulationParams.
 */

use nannou_egui::{egui, Egui};

use crate::app::{FrameStats, ViewOptions};
use crate::flock::TickReport;
use crate::params::{ParamChanges, SimulationParams};
use crate::rules::RuleKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct UiResponse {
    pub reset_requested: bool,
    pub changes: ParamChanges,
}

// Slider range for a rule's magnitude
fn magnitude_range(kind: RuleKind) -> std::ops::RangeInclusive<f32> {
    match kind {
        RuleKind::Confine => SimulationParams::confine_range(),
        RuleKind::MaxForce | RuleKind::MaxVelocity => SimulationParams::clamp_range(),
        _ => SimulationParams::magnitude_range(),
    }
}

pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    view: &mut ViewOptions,
    stats: &FrameStats,
    report: TickReport,
) -> UiResponse {
    let mut reset_requested = false;

    // Remember the values before any widget can touch them
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Swarm Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(
                    egui::Slider::new(&mut params.population, SimulationParams::population_range())
                        .text("Agents"),
                );
                if ui.button("Reset Swarm").clicked() {
                    reset_requested = true;
                }
            });

            ui.collapsing("Rules", |ui| {
                for (kind, setting) in params.rules.iter_mut() {
                    ui.horizontal(|ui| {
                        ui.checkbox(&mut setting.enabled, kind.label());
                        ui.add(
                            egui::Slider::new(&mut setting.magnitude, magnitude_range(kind))
                                .logarithmic(kind == RuleKind::Confine),
                        );
                    });
                }
            });

            ui.collapsing("Display", |ui| {
                ui.checkbox(&mut view.show_grid, "Show Grid");
                ui.checkbox(&mut view.show_aggregates, "Show Cell Aggregates");
            });

            ui.separator();
            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!("Frame time: {:.2} ms", stats.frame_time.as_secs_f64() * 1000.0));
            ui.label(format!("Steps this frame: {}", stats.steps_last_frame));
            ui.label(format!("Mean neighbor weight: {:.1}", report.mean_neighbor_weight));
            ui.label(format!("Rescued last tick: {}", report.rescued));

            ui.checkbox(&mut params.paused, "Pause Simulation");
        });

    UiResponse {
        reset_requested,
        changes: params.detect_changes(),
    }
}
