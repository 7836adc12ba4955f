/*
 * Foraging Module
 *
 * A herbivore scores every food by world distance times color distance and
 * heads for the lowest score. Food that is both close and similar in color
 * wins, so a distant food of the herbivore's exact color beats a nearby one
 * of a very different color.
 */

use nannou::prelude::Vec2;

use crate::color::{color_distance, Color};
use crate::factory::EntityId;
use crate::food::Food;
use crate::physics::{PhysicsError, PhysicsWorld};

/// Result of a foraging scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forage {
    pub target: Option<EntityId>,
    /// World distance times color distance of the chosen food
    pub score: f32,
    pub color_distance: f32,
}

impl Forage {
    pub fn none() -> Self {
        Self {
            target: None,
            score: f32::INFINITY,
            color_distance: f32::INFINITY,
        }
    }
}

pub fn find_nearest_food<P: PhysicsWorld + ?Sized>(
    position: Vec2,
    color: Color,
    foods: &[Food],
    physics: &P,
) -> Result<Forage, PhysicsError> {
    let mut nearest = Forage::none();

    for food in foods {
        let world_distance = position.distance(physics.position(food.body)?);
        let color_distance = color_distance(color, food.color);
        let score = world_distance * color_distance;

        // Strictly smaller, so the first of equal scores is kept
        if score < nearest.score {
            nearest = Forage {
                target: Some(food.id),
                score,
                color_distance,
            };
        }
    }

    Ok(nearest)
}

/// Speed toward a target; 1 for a perfect color match, falling toward 0
pub fn approach_speed(color_distance: f32) -> f32 {
    1.0 / (1.0 + color_distance / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{ArenaPhysics, BodyDesc};
    use nannou::prelude::vec2;

    fn food(physics: &mut ArenaPhysics, id: u64, position: Vec2, color: Color) -> Food {
        let body = physics.add_body(BodyDesc::polygon(position, 3, 20.0).with_static(true));
        Food::new(EntityId::new(id), body, color, 20)
    }

    #[test]
    fn test_empty_food_list_has_no_target() {
        let physics = ArenaPhysics::new();
        let forage = find_nearest_food(vec2(1.0, 1.0), Color::new(0, 0, 0), &[], &physics).unwrap();
        assert_eq!(forage, Forage::none());
    }

    #[test]
    fn test_single_food_is_always_chosen() {
        let mut physics = ArenaPhysics::new();
        let only = food(&mut physics, 7, vec2(590.0, 590.0), Color::new(255, 255, 255));

        let forage = find_nearest_food(vec2(10.0, 10.0), Color::new(0, 0, 0), &[only], &physics).unwrap();
        assert_eq!(forage.target, Some(EntityId::new(7)));
        assert!(forage.score.is_finite());
    }

    #[test]
    fn test_color_match_beats_proximity() {
        let mut physics = ArenaPhysics::new();
        let red = Color::new(0xdd, 0x11, 0x11);
        let near_blue = food(&mut physics, 1, vec2(20.0, 0.0), Color::new(0x11, 0x11, 0xdd));
        let far_red = food(&mut physics, 2, vec2(300.0, 0.0), Color::new(0xd0, 0x11, 0x11));

        let forage = find_nearest_food(vec2(0.0, 0.0), red, &[near_blue, far_red], &physics).unwrap();
        assert_eq!(forage.target, Some(EntityId::new(2)));
        assert_eq!(forage.color_distance, 13.0);
    }

    #[test]
    fn test_ties_go_to_the_first_food() {
        let mut physics = ArenaPhysics::new();
        let color = Color::new(10, 10, 10);
        let left = food(&mut physics, 1, vec2(-50.0, 0.0), color);
        let right = food(&mut physics, 2, vec2(50.0, 0.0), color);

        let forage = find_nearest_food(Vec2::ZERO, Color::new(0, 0, 0), &[left, right], &physics).unwrap();
        assert_eq!(forage.target, Some(EntityId::new(1)));
    }

    #[test]
    fn test_exact_color_match_scores_zero() {
        let mut physics = ArenaPhysics::new();
        let color = Color::new(0x11, 0xdd, 0x11);
        let same = food(&mut physics, 3, vec2(400.0, 400.0), color);

        let forage = find_nearest_food(Vec2::ZERO, color, &[same], &physics).unwrap();
        assert_eq!(forage.score, 0.0);
        assert_eq!(approach_speed(forage.color_distance), 1.0);
    }

    #[test]
    fn test_approach_speed_never_reverses() {
        assert_eq!(approach_speed(0.0), 1.0);
        assert_eq!(approach_speed(100.0), 0.5);
        assert!(approach_speed(441.7) > 0.0);
    }
}
