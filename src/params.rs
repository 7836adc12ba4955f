/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains every tunable
 * constant of the herbivore simulation. Parameters can be loaded from a YAML
 * file, edited through the UI, and are checked by `validate` before a world
 * is built. Edits made in the UI take effect on the next reset; change
 * detection tells the UI when such edits are pending.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{Color, PaletteMode};
use crate::error::{ConfigurationError, Result};
use crate::{FOOD_AMOUNT, HERBIVORE_COLOR, HERBIVORE_SIZE, STEP_SIZE, WORLD_SIZE};

// Parameters for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Side of the square arena in world units
    pub world_size: f32,
    /// Simulated seconds per tick
    pub step_size: f64,
    /// Simulated seconds before the run stops
    pub duration: f64,

    pub herbivore_size: f32,
    pub herbivore_color: Color,
    /// Maximum per-channel color jitter for children
    pub herbivore_variance: f32,
    /// Seconds without food before a herbivore starts foraging
    pub hungry_threshold: f64,
    /// Seconds without food before a herbivore starves
    pub death_threshold: f64,
    pub initial_population: usize,
    /// A herbivore reproduces whenever its feeding count is a multiple of this
    pub reproduction_interval: u32,

    pub initial_food: usize,
    /// Units of food in a fresh food item
    pub food_amount: u32,
    pub food_radius: f32,
    /// Maximum per-axis offset of a replacement food from the depleted one
    pub food_jitter: f32,
    pub palette: Vec<Color>,
    pub palette_mode: PaletteMode,

    pub wall_thickness: f32,
    /// Upper bound on ticks run per rendered frame
    pub max_ticks_per_frame: u32,
    /// Ticks between population summaries in the log
    pub stats_interval: u64,

    // UI state, never read from or written to files
    #[serde(skip)]
    pub show_debug: bool,
    #[serde(skip)]
    pub pause_simulation: bool,

    // Internal state for tracking changes
    #[serde(skip)]
    previous_values: Option<ParamSnapshot>,
}

// A snapshot of the parameters that only take effect on reset
#[derive(Debug, Clone, PartialEq)]
struct ParamSnapshot {
    initial_population: usize,
    initial_food: usize,
    herbivore_variance: f32,
    hungry_threshold: f64,
    death_threshold: f64,
    food_amount: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            step_size: STEP_SIZE,
            duration: 600.0,
            herbivore_size: HERBIVORE_SIZE,
            herbivore_color: HERBIVORE_COLOR,
            herbivore_variance: 25.0,
            hungry_threshold: 0.4,
            death_threshold: 12.0,
            initial_population: 60,
            reproduction_interval: 5,
            initial_food: 2,
            food_amount: FOOD_AMOUNT,
            food_radius: 20.0,
            food_jitter: 90.0,
            palette: vec![
                Color::new(0xdd, 0x11, 0x11),
                Color::new(0x11, 0xdd, 0x11),
                Color::new(0x11, 0x11, 0xdd),
            ],
            palette_mode: PaletteMode::Exhaust,
            wall_thickness: 10.0,
            max_ticks_per_frame: 10,
            stats_interval: 500,
            show_debug: false,
            pause_simulation: false,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    /// Load parameters from a YAML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let params: SimulationParams = serde_yaml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject parameters that cannot produce a working world
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        use ConfigurationError::InvalidParameter;

        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(InvalidParameter("step_size must be positive"));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(InvalidParameter("duration must be positive"));
        }
        let lengths = [
            self.world_size,
            self.herbivore_size,
            self.herbivore_variance,
            self.food_radius,
            self.food_jitter,
            self.wall_thickness,
        ];
        if !lengths.iter().all(|v| v.is_finite()) {
            return Err(InvalidParameter("sizes and jitter ranges must be finite"));
        }
        if !(self.hungry_threshold.is_finite() && self.death_threshold.is_finite()) {
            return Err(InvalidParameter("hunger thresholds must be finite"));
        }
        if !(self.herbivore_size > 0.0) {
            return Err(InvalidParameter("herbivore_size must be positive"));
        }
        if !(self.world_size > 2.0 * self.herbivore_size) {
            return Err(InvalidParameter("world_size must exceed twice the herbivore_size"));
        }
        if !(self.herbivore_variance >= 0.0) || !(self.food_jitter >= 0.0) {
            return Err(InvalidParameter("jitter ranges must not be negative"));
        }
        if !(self.hungry_threshold >= 0.0 && self.hungry_threshold <= self.death_threshold) {
            return Err(InvalidParameter("hungry_threshold must lie between 0 and death_threshold"));
        }
        if self.reproduction_interval == 0 {
            return Err(InvalidParameter("reproduction_interval must be at least 1"));
        }
        if self.food_amount == 0 {
            return Err(InvalidParameter("food_amount must be at least 1"));
        }
        if !(self.food_radius > 0.0) {
            return Err(InvalidParameter("food_radius must be positive"));
        }
        if !(self.wall_thickness >= 0.0) {
            return Err(InvalidParameter("wall_thickness must not be negative"));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(InvalidParameter("max_ticks_per_frame must be at least 1"));
        }
        if self.palette_mode == PaletteMode::Cycle && self.palette.is_empty() {
            return Err(InvalidParameter("a cycling palette needs at least one color"));
        }
        Ok(())
    }

    /// Number of ticks in the whole run
    pub fn total_ticks(&self) -> u64 {
        (self.duration / self.step_size).ceil() as u64
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    // Check whether reset-only parameters changed since the last snapshot
    pub fn detect_changes(&self) -> bool {
        match &self.previous_values {
            Some(prev) => *prev != self.snapshot(),
            None => false,
        }
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            initial_population: self.initial_population,
            initial_food: self.initial_food,
            herbivore_variance: self.herbivore_variance,
            hungry_threshold: self.hungry_threshold,
            death_threshold: self.death_threshold,
            food_amount: self.food_amount,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_population_range() -> std::ops::RangeInclusive<usize> {
        1..=1000
    }

    pub fn get_food_range() -> std::ops::RangeInclusive<usize> {
        1..=12
    }

    pub fn get_variance_range() -> std::ops::RangeInclusive<f32> {
        0.0..=128.0
    }

    pub fn get_threshold_range() -> std::ops::RangeInclusive<f64> {
        0.0..=60.0
    }

    pub fn get_food_amount_range() -> std::ops::RangeInclusive<u32> {
        1..=100
    }
}
