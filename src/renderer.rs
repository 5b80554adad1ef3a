/*
 * Renderer Module
 *
 * This module draws the swarm. The simulation domain [0, span)^2 is fitted
 * into the window, centred, with its y axis pointing up like nannou's.
 * Agents are drawn as small triangles facing along their velocity.
 */

use nannou::prelude::*;
use tracing::error;

use crate::app::Model;
use crate::spatial_grid::SpatialGrid;
use crate::vector::Vector2;

const AGENT_SIZE: f32 = 4.0;

// Fraction of the shorter window side the domain occupies
const FILL: f32 = 0.95;

// Maps domain coordinates onto window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainMapping {
    scale: f32,
    half_span: f32,
}

impl DomainMapping {
    pub fn fit(span: f32, window_rect: Rect) -> Self {
        let side = window_rect.w().min(window_rect.h()) * FILL;
        Self {
            scale: side / span,
            half_span: span * 0.5,
        }
    }

    #[inline]
    pub fn to_screen(&self, p: Vector2) -> Point2 {
        pt2((p.x - self.half_span) * self.scale, (p.y - self.half_span) * self.scale)
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    // Side length of the domain on screen
    #[inline]
    pub fn side(&self) -> f32 {
        self.half_span * 2.0 * self.scale
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let grid = model.simulation.grid();
    let mapping = DomainMapping::fit(grid.domain().span(), app.window_rect());

    // Domain boundary
    draw.rect()
        .x_y(0.0, 0.0)
        .w_h(mapping.side(), mapping.side())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    if model.view.show_grid {
        draw_grid_lines(&draw, grid, &mapping);
    }
    if model.view.show_aggregates {
        draw_aggregates(&draw, grid, &mapping);
    }

    let flock = model.simulation.flock();
    for (&position, &velocity) in flock.positions().iter().zip(flock.velocities()) {
        draw_agent(&draw, &mapping, position, velocity);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "failed to draw the swarm");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!(?err, "failed to draw the control panel");
    }
}

fn draw_agent(draw: &Draw, mapping: &DomainMapping, position: Vector2, velocity: Vector2) {
    let angle = velocity.y.atan2(velocity.x);

    let points = [
        pt2(AGENT_SIZE, 0.0),
        pt2(-AGENT_SIZE, AGENT_SIZE / 2.0),
        pt2(-AGENT_SIZE, -AGENT_SIZE / 2.0),
    ];

    draw.polygon()
        .color(rgb(0.86, 0.86, 0.86))
        .points(points)
        .xy(mapping.to_screen(position))
        .rotate(angle);
}

fn draw_grid_lines(draw: &Draw, grid: &SpatialGrid, mapping: &DomainMapping) {
    let span = grid.domain().span();
    for i in 1..grid.nodes_per_axis() {
        let offset = i as f32 * grid.cell_span();

        draw.line()
            .start(mapping.to_screen(Vector2::new(offset, 0.0)))
            .end(mapping.to_screen(Vector2::new(offset, span)))
            .weight(1.0)
            .color(rgba(0.2, 0.2, 0.35, 1.0));
        draw.line()
            .start(mapping.to_screen(Vector2::new(0.0, offset)))
            .end(mapping.to_screen(Vector2::new(span, offset)))
            .weight(1.0)
            .color(rgba(0.2, 0.2, 0.35, 1.0));
    }
}

// One circle per occupied cell at its mean position, sized by member count
fn draw_aggregates(draw: &Draw, grid: &SpatialGrid, mapping: &DomainMapping) {
    for cell in 0..grid.cell_count() {
        if let Some(aggregate) = grid.aggregate(cell) {
            draw.ellipse()
                .xy(mapping.to_screen(aggregate.position))
                .radius(aggregate.weight.sqrt() * 1.5)
                .no_fill()
                .stroke(rgba(0.9, 0.5, 0.1, 0.6))
                .stroke_weight(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_maps_to_origin() {
        let mapping = DomainMapping::fit(256.0, Rect::from_w_h(800.0, 600.0));
        let centre = mapping.to_screen(Vector2::new(128.0, 128.0));
        assert!(centre.x.abs() < 1e-4 && centre.y.abs() < 1e-4);
    }

    #[test]
    fn domain_fits_the_shorter_side() {
        let rect = Rect::from_w_h(800.0, 600.0);
        let mapping = DomainMapping::fit(256.0, rect);
        assert!((mapping.side() - 600.0 * FILL).abs() < 1e-3);

        let corner = mapping.to_screen(Vector2::new(256.0, 256.0));
        assert!(corner.x < rect.right() && corner.y < rect.top());
        assert!(corner.y > 0.0);
    }
}
