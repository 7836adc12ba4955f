/*
 * Entity Factory Module
 *
 * Builds herbivores, food and the arena walls, and registers their bodies
 * with the physics world. Entity ids come from a monotonic allocator owned
 * here and are unrelated to physics body handles. Food colors are drawn from
 * the palette; a palette that runs dry is a configuration error.
 */

use std::fmt;

use log::debug;
use nannou::prelude::{vec2, Vec2};
use rand::Rng;

use crate::color::{self, Color, Palette};
use crate::error::Result;
use crate::food::Food;
use crate::herbivore::Herbivore;
use crate::params::SimulationParams;
use crate::physics::{
    BodyDesc, BodyHandle, CollisionFilter, PhysicsWorld, CATEGORY_DEFAULT, CATEGORY_HERBIVORES,
};

const WALL_COLOR: Color = Color::new(0x80, 0x80, 0x80);
const FOOD_SIDES: usize = 3;

/// Stable identity of a herbivore or food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

// Uniform offset in [-amount, amount]; zero when the range is empty
fn jitter<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> f32 {
    if amount > 0.0 {
        rng.gen_range(-amount..=amount)
    } else {
        0.0
    }
}

pub struct EntityFactory {
    params: SimulationParams,
    palette: Palette,
    next_id: u64,
}

impl EntityFactory {
    pub fn new<R: Rng + ?Sized>(params: SimulationParams, rng: &mut R) -> Self {
        let palette = Palette::new(params.palette.clone(), params.palette_mode, rng);
        Self {
            params,
            palette,
            next_id: 0,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Uniform point at least one herbivore size away from every edge
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let (lo, hi) = self.bounds();
        let x = rng.gen_range(lo..=hi);
        let y = rng.gen_range(lo..=hi);
        vec2(x, y)
    }

    pub fn clamp_position(&self, position: Vec2) -> Vec2 {
        let (lo, hi) = self.bounds();
        vec2(position.x.clamp(lo, hi), position.y.clamp(lo, hi))
    }

    fn bounds(&self) -> (f32, f32) {
        let size = self.params.herbivore_size;
        (size, self.params.world_size - size)
    }

    pub fn create_herbivore<P, R>(
        &mut self,
        physics: &mut P,
        rng: &mut R,
        color: Option<Color>,
        position: Option<Vec2>,
    ) -> Herbivore
    where
        P: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let position = position.unwrap_or_else(|| self.random_position(rng));
        let color = color.unwrap_or(self.params.herbivore_color);

        let filter = CollisionFilter {
            category: CATEGORY_HERBIVORES,
            mask: CATEGORY_DEFAULT,
        };
        let body = physics.add_body(
            BodyDesc::circle(position, self.params.herbivore_size / 2.0)
                .with_filter(filter)
                .with_fill(color),
        );

        Herbivore::new(self.allocate_id(), body, color)
    }

    /// A child next to `parent` with a slightly different color
    pub fn mutate_herbivore<P, R>(&mut self, physics: &mut P, rng: &mut R, parent: &Herbivore) -> Result<Herbivore>
    where
        P: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let spread = self.params.herbivore_size * 2.0;
        let offset = vec2(jitter(rng, spread), jitter(rng, spread));
        let position = self.clamp_position(physics.position(parent.body)? + offset);
        let color = color::jitter_color(parent.color, self.params.herbivore_variance, rng);

        let child = self.create_herbivore(physics, rng, Some(color), Some(position));
        debug!("{} spawned {} with color {}", parent.id, child.id, color);
        Ok(child)
    }

    pub fn create_food<P, R>(
        &mut self,
        physics: &mut P,
        rng: &mut R,
        color: Option<Color>,
        position: Option<Vec2>,
    ) -> Result<Food>
    where
        P: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let position = position.unwrap_or_else(|| self.random_position(rng));
        let color = match color {
            Some(color) => color,
            None => self.palette.next(rng)?,
        };

        let body = physics.add_body(
            BodyDesc::polygon(position, FOOD_SIDES, self.params.food_radius)
                .with_static(true)
                .with_fill(color),
        );

        Ok(Food::new(self.allocate_id(), body, color, self.params.food_amount))
    }

    /// A full replacement for `parent`, placed nearby in the same color
    pub fn mutate_food<P, R>(&mut self, physics: &mut P, rng: &mut R, parent: &Food) -> Result<Food>
    where
        P: PhysicsWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let spread = self.params.food_jitter;
        let offset = vec2(jitter(rng, spread), jitter(rng, spread));
        let position = self.clamp_position(physics.position(parent.body)? + offset);

        self.create_food(physics, rng, Some(parent.color), Some(position))
    }

    /// Static frame of four rectangles centered on the arena edges
    pub fn create_walls<P: PhysicsWorld + ?Sized>(&self, physics: &mut P) -> BodyHandle {
        let size = self.params.world_size;
        let thickness = self.params.wall_thickness;
        let half = size / 2.0;

        let walls = BodyDesc::compound(vec![
            BodyDesc::rectangle(vec2(half, size), size, thickness),
            BodyDesc::rectangle(vec2(half, 0.0), size, thickness),
            BodyDesc::rectangle(vec2(0.0, half), thickness, size),
            BodyDesc::rectangle(vec2(size, half), thickness, size),
        ])
        .with_static(true)
        .with_fill(WALL_COLOR);

        physics.add_body(walls)
    }
}
