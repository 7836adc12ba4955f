/*
 * Renderer Module
 *
 * This module draws the simulation: every physics body is filled with its
 * own color, walls included. World coordinates grow downwards from the
 * arena's top-left corner; the arena is drawn centered in the window.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::color::Color;
use crate::physics::PhysicsWorld;
use crate::simulation::SimulationState;
use crate::ui;

// Map a world point to window coordinates
pub fn world_to_screen(point: Vec2, world_size: f32) -> Vec2 {
    let half = world_size / 2.0;
    vec2(point.x - half, half - point.y)
}

fn fill(color: Color) -> Rgb<u8> {
    rgb(color.r, color.g, color.b)
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    if let Some(state) = &model.state {
        draw_bodies(&draw, state);

        if model.params.show_debug {
            draw_targets(&draw, state);
        }
    }

    if model.params.show_debug {
        ui::draw_debug_info(&draw, &model.debug_info, app.window_rect());
    }

    draw.to_frame(app, &frame).unwrap();

    // Draw the egui UI
    model.egui.draw_to_frame(&frame).unwrap();
}

fn draw_bodies(draw: &Draw, state: &SimulationState) {
    let world_size = state.params.world_size;

    for body in state.physics.bodies() {
        for hull in body.world_parts() {
            draw.polygon()
                .color(fill(body.fill))
                .points(hull.into_iter().map(|p| world_to_screen(p, world_size)));
        }
    }
}

// Line from each foraging herbivore to the food it is heading for
fn draw_targets(draw: &Draw, state: &SimulationState) {
    let world_size = state.params.world_size;

    for herbivore in &state.herbivores {
        let Some(food) = herbivore.target.and_then(|id| state.food(id)) else {
            continue;
        };
        let (Ok(from), Ok(to)) = (state.physics.position(herbivore.body), state.physics.position(food.body)) else {
            continue;
        };

        draw.line()
            .start(world_to_screen(from, world_size))
            .end(world_to_screen(to, world_size))
            .color(rgba(1.0, 1.0, 0.0, 0.4))
            .stroke_weight(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_corners_map_to_window_corners() {
        assert_eq!(world_to_screen(vec2(0.0, 0.0), 600.0), vec2(-300.0, 300.0));
        assert_eq!(world_to_screen(vec2(600.0, 600.0), 600.0), vec2(300.0, -300.0));
        assert_eq!(world_to_screen(vec2(300.0, 300.0), 600.0), Vec2::ZERO);
    }
}
