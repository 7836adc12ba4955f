//! Integration tests for the herbivore simulation

use herbivores::color::PaletteMode;
use herbivores::{
    step, ArenaPhysics, Color, ConfigurationError, PhysicsWorld, SimulationError, SimulationParams,
    SimulationState,
};
use nannou::prelude::vec2;

const RED: Color = Color::new(0xdd, 0x11, 0x11);

fn small_params() -> SimulationParams {
    let mut params = SimulationParams::default();
    params.initial_population = 20;
    params
}

#[test]
fn test_feeding_end_to_end() {
    let mut state = SimulationState::empty(SimulationParams::default(), ArenaPhysics::new(), 7).unwrap();
    let food = state.spawn_food(Some(RED), Some(vec2(200.0, 200.0))).unwrap();
    let herbivore = state.spawn_herbivore(Some(RED), Some(vec2(200.0, 200.0)));
    state.herbivore_mut(herbivore).unwrap().hungry = 50;

    let (state, report) = step(state).unwrap();

    assert_eq!(report.feedings, 1);
    assert_eq!(state.food(food).unwrap().amount, 19);
    assert_eq!(state.herbivore(herbivore).unwrap().hungry, 0);
}

#[test]
fn test_food_is_eaten_down_and_replaced() {
    let mut params = SimulationParams::default();
    params.food_amount = 3;
    params.hungry_threshold = 0.0;
    let mut state = SimulationState::empty(params, ArenaPhysics::new(), 7).unwrap();
    let first = state.spawn_food(Some(RED), Some(vec2(300.0, 300.0))).unwrap();
    state.spawn_herbivore(Some(RED), Some(vec2(300.0, 300.0)));

    // Three feedings empty the food; the third tick replaces it
    let mut state = state;
    for _ in 0..3 {
        state = step(state).unwrap().0;
    }

    assert_eq!(state.foods.len(), 1);
    assert!(state.food(first).is_none());
    assert_eq!(state.foods[0].amount, 3);
    assert_eq!(state.foods[0].color, RED);
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut state = SimulationState::with_seed(small_params(), seed).unwrap();
        for _ in 0..300 {
            state = step(state).unwrap().0;
        }
        let herbivores: Vec<_> = state
            .herbivores
            .iter()
            .map(|h| (h.color, state.physics.position(h.body).unwrap()))
            .collect();
        let foods: Vec<_> = state.foods.iter().map(|f| (f.color, f.amount)).collect();
        (herbivores, foods)
    };

    assert_eq!(run(11), run(11));
}

#[test]
fn test_world_stays_consistent_over_a_run() {
    let mut state = SimulationState::with_seed(small_params(), 2024).unwrap();
    let mut population = state.population();

    for _ in 0..1500 {
        let (next, report) = step(state).unwrap();
        state = next;

        assert_eq!(state.population(), population + report.births - report.deaths);
        population = state.population();

        assert_eq!(state.foods.len(), 2);
        for food in &state.foods {
            assert!(food.amount >= 1);
            assert!(state.physics.contains(food.body));
        }
        for herbivore in &state.herbivores {
            let p = state.physics.position(herbivore.body).unwrap();
            assert!(p.x > 0.0 && p.x < 600.0, "x out of arena: {}", p.x);
            assert!(p.y > 0.0 && p.y < 600.0, "y out of arena: {}", p.y);
        }
    }

    // Herbivores, food and the walls are the only bodies
    assert_eq!(state.physics.body_count(), state.population() + state.foods.len() + 1);
}

#[test]
fn test_unfed_population_dies_out() {
    let mut params = small_params();
    params.initial_food = 0;
    let mut state = SimulationState::with_seed(params, 5).unwrap();

    // 12s is 1200 ticks; everyone starves on the next one
    for _ in 0..1200 {
        state = step(state).unwrap().0;
    }
    assert_eq!(state.population(), 20);

    let (state, report) = step(state).unwrap();
    assert_eq!(report.deaths, 20);
    assert_eq!(state.population(), 0);
    assert_eq!(state.physics.body_count(), 1);
}

#[test]
fn test_palette_exhaustion() {
    let mut params = small_params();
    params.initial_food = 4;
    let result = SimulationState::with_seed(params.clone(), 1);
    assert!(matches!(
        result,
        Err(SimulationError::Configuration(ConfigurationError::PaletteExhausted { .. }))
    ));

    params.palette_mode = PaletteMode::Cycle;
    let state = SimulationState::with_seed(params, 1).unwrap();
    assert_eq!(state.foods.len(), 4);
}

#[test]
fn test_params_file_drives_the_world() {
    let path = std::env::temp_dir().join("herbivores_test_params.yaml");
    std::fs::write(&path, "initial_population: 3\ninitial_food: 1\nfood_amount: 7\n").unwrap();

    let params = SimulationParams::from_file(&path).unwrap();
    let state = SimulationState::with_seed(params, 8).unwrap();

    assert_eq!(state.population(), 3);
    assert_eq!(state.foods.len(), 1);
    assert_eq!(state.foods[0].amount, 7);

    let _ = std::fs::remove_file(&path);
}
