/*
 * Application Module
 *
 * This module defines the window model for the herbivore simulation.
 * It handles initialization, the per-frame update and resets.
 *
 * The simulation advances on a fixed timestep: frame time is added to an
 * accumulator and one tick runs per step size it holds, up to a per-frame
 * cap so a slow frame cannot snowball into ever longer catch-up. The app
 * quits once the simulated duration has been reached.
 */

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{error, info, warn};
use nannou::prelude::*;
use nannou_egui::Egui;

use crate::debug::DebugInfo;
use crate::input::{key_pressed, raw_window_event};
use crate::params::SimulationParams;
use crate::renderer::view;
use crate::simulation::{self, RunSummary, SimulationState};
use crate::ui;

// World handed from `run` to `model`, which nannou calls without arguments
static LAUNCH: Mutex<Option<SimulationState>> = Mutex::new(None);

// Main model for the application
pub struct Model {
    /// None once a tick has failed; the window then only shows the error
    pub state: Option<SimulationState>,
    /// Parameters edited by the UI, applied on reset
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub summary: RunSummary,
    // Fixed timestep variables
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
}

/// Open the window and run `state` in it until the window is closed
pub fn run(state: SimulationState) {
    stash_launch_state(state);
    nannou::app(model).update(update).run();
}

// A poisoned slot still holds a usable world
fn launch_slot() -> MutexGuard<'static, Option<SimulationState>> {
    LAUNCH.lock().unwrap_or_else(|poisoned| {
        error!("Launch slot was poisoned by a panic; recovering the stored world");
        poisoned.into_inner()
    })
}

fn stash_launch_state(state: SimulationState) {
    *launch_slot() = Some(state);
}

fn take_launch_state() -> Option<SimulationState> {
    launch_slot().take()
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let state = match take_launch_state() {
        Some(state) => state,
        None => {
            warn!("No world was handed to the window; starting one from default parameters");
            SimulationState::new(SimulationParams::default()).expect("Default parameters are valid")
        }
    };

    let world_size = state.params.world_size as u32;
    let window_id = app
        .new_window()
        .title("Herbivores")
        .size(world_size + 400, world_size + 80)
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let params = state.params.clone();
    let summary = RunSummary::new(&state);
    let mut debug_info = DebugInfo::default();
    debug_info.observe(&state);

    Model {
        physics_step_size: Duration::from_secs_f64(state.params.step_size),
        state: Some(state),
        params,
        egui,
        debug_info,
        summary,
        physics_accumulator: Duration::ZERO,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let (should_reset, params_changed) = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);
    if params_changed {
        model.debug_info.pending_changes = true;
    }
    if should_reset {
        reset_simulation(model);
    }

    let current_time = Instant::now();
    let frame_time = current_time.duration_since(model.last_update_time);
    model.last_update_time = current_time;

    if model.params.pause_simulation {
        model.debug_info.ticks_per_frame = 0;
        return;
    }

    model.physics_accumulator += frame_time;

    let mut ticks_this_frame = 0;
    while model.physics_accumulator >= model.physics_step_size && ticks_this_frame < model.params.max_ticks_per_frame {
        if !advance(model) {
            break;
        }
        model.physics_accumulator -= model.physics_step_size;
        ticks_this_frame += 1;
    }

    // Whatever the cap left behind is dropped rather than carried over
    if ticks_this_frame == model.params.max_ticks_per_frame {
        model.physics_accumulator = Duration::ZERO;
    }
    model.debug_info.ticks_per_frame = ticks_this_frame;

    if model.debug_info.finished {
        info!("Run complete\n{}", model.summary);
        app.quit();
    }
}

// Run one tick; false when nothing ran
fn advance(model: &mut Model) -> bool {
    let Some(state) = model.state.take() else {
        return false;
    };

    if state.is_finished() {
        model.state = Some(state);
        return false;
    }

    match simulation::step(state) {
        Ok((state, report)) => {
            model.summary.record(&report, &state);
            model.debug_info.observe(&state);
            model.debug_info.last_report = report;
            model.state = Some(state);
            true
        }
        Err(err) => {
            error!("Simulation halted: {}", err);
            model.debug_info.error = Some(err.to_string());
            false
        }
    }
}

/// Rebuild the world from the parameters edited in the UI
pub fn reset_simulation(model: &mut Model) {
    match SimulationState::new(model.params.clone()) {
        Ok(state) => {
            info!("World reset with seed {}", state.seed());
            model.physics_step_size = Duration::from_secs_f64(state.params.step_size);
            model.physics_accumulator = Duration::ZERO;
            model.summary = RunSummary::new(&state);
            model.debug_info = DebugInfo {
                fps: model.debug_info.fps,
                frame_time: model.debug_info.frame_time,
                ..DebugInfo::default()
            };
            model.debug_info.observe(&state);
            model.state = Some(state);
        }
        Err(err) => {
            // Keep the running world; the UI shows why the reset failed
            warn!("Reset rejected: {}", err);
            model.debug_info.error = Some(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_state_survives_a_poisoned_slot() {
        let poisoner = std::thread::spawn(|| {
            let _guard = LAUNCH.lock();
            panic!("poison the slot");
        });
        assert!(poisoner.join().is_err());
        assert!(LAUNCH.is_poisoned());

        let state = SimulationState::with_seed(SimulationParams::default(), 31).unwrap();
        stash_launch_state(state);

        let taken = take_launch_state().unwrap();
        assert_eq!(taken.seed(), 31);
        assert!(take_launch_state().is_none());
    }
}
