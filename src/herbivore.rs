/*
 * Herbivore Module
 *
 * This module defines the Herbivore record. Position, angle and velocity
 * live in the physics world; the herbivore keeps a handle to its body plus
 * the counters the simulation rule reads and writes every tick:
 * 1. hungry: ticks since the last feeding
 * 2. feeded: successful feedings so far, starting at 1
 * 3. target: the food it is currently heading for, if any
 */

use crate::color::Color;
use crate::factory::EntityId;
use crate::params::SimulationParams;
use crate::physics::BodyHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Herbivore {
    pub id: EntityId,
    pub body: BodyHandle,
    pub color: Color,
    pub target: Option<EntityId>,
    pub hungry: u32,
    pub feeded: u32,
}

impl Herbivore {
    pub fn new(id: EntityId, body: BodyHandle, color: Color) -> Self {
        Self {
            id,
            body,
            color,
            target: None,
            hungry: 0,
            feeded: 1,
        }
    }

    /// Simulated seconds since the last feeding
    pub fn hunger_time(&self, step_size: f64) -> f64 {
        self.hungry as f64 * step_size
    }

    pub fn is_hungry(&self, params: &SimulationParams) -> bool {
        self.hunger_time(params.step_size) >= params.hungry_threshold
    }

    pub fn is_starved(&self, params: &SimulationParams) -> bool {
        self.hunger_time(params.step_size) > params.death_threshold
    }

    // Record a successful feeding
    pub fn feed(&mut self) {
        self.hungry = 0;
        self.feeded += 1;
    }

    pub fn should_reproduce(&self, interval: u32) -> bool {
        interval > 0 && self.feeded > 0 && self.feeded % interval == 0
    }
}
