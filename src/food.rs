/*
 * Food Module
 *
 * A food item is a static triangle holding a finite amount of food. Each
 * feeding takes one unit and shrinks the body; an empty item is replaced by
 * the simulation, never left in the world.
 */

use crate::color::Color;
use crate::factory::EntityId;
use crate::physics::BodyHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: EntityId,
    pub body: BodyHandle,
    pub color: Color,
    pub amount: u32,
}

impl Food {
    pub fn new(id: EntityId, body: BodyHandle, color: Color, amount: u32) -> Self {
        Self { id, body, color, amount }
    }

    /// Take one unit and return the factor the body should be scaled by
    pub fn consume(&mut self) -> f32 {
        self.amount = self.amount.saturating_sub(1);
        self.amount as f32 / (self.amount as f32 + 1.0)
    }

    pub fn is_depleted(&self) -> bool {
        self.amount == 0
    }
}
