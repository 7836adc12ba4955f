/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. The controls edit a pending copy of the parameters;
 * population and food settings only take effect when the world is reset.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SimulationParams;

// Update the UI and return whether the world should be rebuilt and whether any reset-only parameter changed
pub fn update_ui(egui: &mut Egui, params: &mut SimulationParams, debug_info: &DebugInfo) -> (bool, bool) {
    let mut should_reset = false;

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Population", |ui| {
                ui.add(
                    egui::Slider::new(&mut params.initial_population, SimulationParams::get_population_range())
                        .text("Herbivores"),
                );
                ui.add(
                    egui::Slider::new(&mut params.herbivore_variance, SimulationParams::get_variance_range())
                        .text("Color Variance"),
                );
                ui.add(
                    egui::Slider::new(&mut params.hungry_threshold, SimulationParams::get_threshold_range())
                        .text("Hungry After (s)"),
                );
                ui.add(
                    egui::Slider::new(&mut params.death_threshold, SimulationParams::get_threshold_range())
                        .text("Starve After (s)"),
                );
            });

            ui.collapsing("Food", |ui| {
                ui.add(egui::Slider::new(&mut params.initial_food, SimulationParams::get_food_range()).text("Food Items"));
                ui.add(
                    egui::Slider::new(&mut params.food_amount, SimulationParams::get_food_amount_range())
                        .text("Food Amount"),
                );
                ui.label(format!("Palette: {} colors, {:?} mode", params.palette.len(), params.palette_mode));
                ui.label(format!(
                    "Colors used: {}, left: {}",
                    debug_info.palette_allocated, debug_info.palette_remaining
                ));
            });

            if debug_info.pending_changes {
                ui.label("Changes apply on reset");
            }
            if ui.button("Reset World").clicked() {
                should_reset = true;
            }

            ui.separator();

            ui.label(format!(
                "Tick: {} / {} ({:.1}s)",
                debug_info.tick, debug_info.total_ticks, debug_info.elapsed
            ));
            ui.label(format!("Herbivores: {}", debug_info.population));
            ui.label(format!("Food Items: {}", debug_info.food_count));
            ui.label(format!("FPS: {:.1}", debug_info.fps));
            if debug_info.finished {
                ui.label("Run complete");
            }
            if let Some(error) = &debug_info.error {
                ui.colored_label(egui::Color32::RED, error.as_str());
            }

            ui.checkbox(&mut params.show_debug, "Show Debug Info");
            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    (should_reset, params.detect_changes())
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    // Create a background panel in the top-right corner
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0),
        format!("Ticks this frame: {}", debug_info.ticks_per_frame),
        format!("Herbivores: {}", debug_info.population),
        format!("Food items: {}", debug_info.food_count),
        format!(
            "Last tick: +{} -{} fed {}",
            debug_info.last_report.births, debug_info.last_report.deaths, debug_info.last_report.feedings
        ),
    ];

    let panel_height = line_height * debug_texts.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        // Position the text with a fixed offset from the left edge
        draw.text(text)
            .x_y(text_x + 80.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
