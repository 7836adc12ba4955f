/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains frame metrics and
 * a summary of the running simulation, shown in the UI and in the overlay.
 *
 * Includes:
 * - FPS (frames per second) and frame time
 * - Ticks run during the last frame
 * - Population and food counts, tick and simulated time
 * - Food colors handed out and left in the palette
 * - Whether UI edits are waiting for a reset
 * - The last error the window had to report, if any
 */

use std::time::Duration;

use crate::physics::PhysicsWorld;
use crate::simulation::{SimulationState, TickReport};

// Debug information to display
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks_per_frame: u32,
    pub population: usize,
    pub food_count: usize,
    pub tick: u64,
    pub total_ticks: u64,
    pub elapsed: f64,
    pub last_report: TickReport,
    pub finished: bool,
    pub palette_remaining: usize,
    pub palette_allocated: usize,
    /// Reset-only parameters were edited since the world was built
    pub pending_changes: bool,
    pub error: Option<String>,
}

impl DebugInfo {
    /// Refresh the simulation counters from a state
    pub fn observe<P: PhysicsWorld>(&mut self, state: &SimulationState<P>) {
        self.population = state.population();
        self.food_count = state.foods.len();
        self.tick = state.tick;
        self.total_ticks = state.params.total_ticks();
        self.elapsed = state.elapsed();
        self.finished = state.is_finished();

        let palette = state.factory.palette();
        self.palette_remaining = palette.remaining();
        self.palette_allocated = palette.allocated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParams;

    #[test]
    fn test_observe_reads_palette_and_run_length() {
        let state = SimulationState::with_seed(SimulationParams::default(), 4).unwrap();
        let mut info = DebugInfo::default();
        info.observe(&state);

        assert_eq!(info.population, 60);
        assert_eq!(info.food_count, 2);
        assert_eq!(info.total_ticks, 60_000);
        assert_eq!(info.palette_allocated, 2);
        assert_eq!(info.palette_remaining, 1);
        assert!(!info.finished);
    }
}
