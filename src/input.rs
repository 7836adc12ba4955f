/*
 * Input Module
 *
 * This module handles user input events for the herbivore window.
 *
 * Features:
 * - Space pauses and resumes the simulation
 * - R rebuilds the world from the parameters in the UI
 * - D toggles the debug overlay
 * - Raw window events are forwarded to egui
 */

use nannou::prelude::*;

use crate::app::{self, Model};

// Keyboard shortcuts, ignored while egui has keyboard focus
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::Space => model.params.pause_simulation = !model.params.pause_simulation,
        Key::R => app::reset_simulation(model),
        Key::D => model.params.show_debug = !model.params.show_debug,
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    // Pass events to egui
    model.egui.handle_raw_event(event);
}
