/*
 * Simulation Module
 *
 * This module owns the per-tick rule. A tick advances the physics world by
 * one fixed step and then, for every herbivore in order:
 * 1. Ages its hunger counter
 * 2. Leaves it alone while it is not hungry yet
 * 3. Removes it once it has starved
 * 4. Otherwise picks the best food and heads for it, slower for worse color matches
 * 5. Feeds it when its body touches the target: the food shrinks and is
 *    replaced once empty, and every few feedings a mutated child is born
 *
 * The herbivore list is rebuilt once per tick, so births and deaths never
 * change the scan order within a tick. `step` takes the state by value and
 * returns it; wall-clock pacing is left to the caller.
 */

use std::fmt;

use log::{debug, info};
use nannou::prelude::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::color::Color;
use crate::error::Result;
use crate::factory::{EntityFactory, EntityId};
use crate::food::Food;
use crate::foraging::{approach_speed, find_nearest_food};
use crate::herbivore::Herbivore;
use crate::params::SimulationParams;
use crate::physics::{ArenaPhysics, BodyHandle, PhysicsWorld};

/// Everything a running simulation owns
pub struct SimulationState<P: PhysicsWorld = ArenaPhysics> {
    pub params: SimulationParams,
    pub physics: P,
    pub factory: EntityFactory,
    pub herbivores: Vec<Herbivore>,
    pub foods: Vec<Food>,
    pub walls: BodyHandle,
    pub tick: u64,
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimulationState<ArenaPhysics> {
    /// Populated world with a random seed
    pub fn new(params: SimulationParams) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::with_seed(params, seed)
    }

    /// Populated world with a specific seed for reproducibility
    pub fn with_seed(params: SimulationParams, seed: u64) -> Result<Self> {
        Self::populated(params, ArenaPhysics::new(), seed)
    }
}

impl<P: PhysicsWorld> SimulationState<P> {
    /// Walls, the initial population and the initial food
    pub fn populated(params: SimulationParams, physics: P, seed: u64) -> Result<Self> {
        let mut state = Self::empty(params, physics, seed)?;

        for _ in 0..state.params.initial_population {
            state.spawn_herbivore(None, None);
        }
        for _ in 0..state.params.initial_food {
            state.spawn_food(None, None)?;
        }

        info!(
            "World ready: {} herbivores, {} food, seed {}",
            state.herbivores.len(),
            state.foods.len(),
            seed
        );
        Ok(state)
    }

    /// Walls only; entities are added with `spawn_herbivore` and `spawn_food`
    pub fn empty(params: SimulationParams, mut physics: P, seed: u64) -> Result<Self> {
        params.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let factory = EntityFactory::new(params.clone(), &mut rng);
        let walls = factory.create_walls(&mut physics);

        Ok(Self {
            params,
            physics,
            factory,
            herbivores: Vec::new(),
            foods: Vec::new(),
            walls,
            tick: 0,
            rng,
            seed,
        })
    }

    pub fn spawn_herbivore(&mut self, color: Option<Color>, position: Option<Vec2>) -> EntityId {
        let herbivore = self
            .factory
            .create_herbivore(&mut self.physics, &mut self.rng, color, position);
        let id = herbivore.id;
        self.herbivores.push(herbivore);
        id
    }

    pub fn spawn_food(&mut self, color: Option<Color>, position: Option<Vec2>) -> Result<EntityId> {
        let food = self
            .factory
            .create_food(&mut self.physics, &mut self.rng, color, position)?;
        let id = food.id;
        self.foods.push(food);
        Ok(id)
    }

    pub fn herbivore(&self, id: EntityId) -> Option<&Herbivore> {
        self.herbivores.iter().find(|h| h.id == id)
    }

    pub fn herbivore_mut(&mut self, id: EntityId) -> Option<&mut Herbivore> {
        self.herbivores.iter_mut().find(|h| h.id == id)
    }

    pub fn food(&self, id: EntityId) -> Option<&Food> {
        self.foods.iter().find(|f| f.id == id)
    }

    pub fn food_mut(&mut self, id: EntityId) -> Option<&mut Food> {
        self.foods.iter_mut().find(|f| f.id == id)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn population(&self) -> usize {
        self.herbivores.len()
    }

    /// Simulated seconds since the start
    pub fn elapsed(&self) -> f64 {
        self.tick as f64 * self.params.step_size
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed() >= self.params.duration
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub births: usize,
    pub deaths: usize,
    pub feedings: usize,
    pub replenished: usize,
}

/// Advance the simulation by one tick
pub fn step<P: PhysicsWorld>(mut state: SimulationState<P>) -> Result<(SimulationState<P>, TickReport)> {
    let delta_ms = (state.params.step_size * 1000.0) as f32;
    state.physics.update(delta_ms);
    state.tick += 1;

    let mut report = TickReport {
        tick: state.tick,
        ..TickReport::default()
    };

    let current = std::mem::take(&mut state.herbivores);
    let mut next = Vec::with_capacity(current.len());

    for mut herbivore in current {
        herbivore.hungry += 1;

        if !herbivore.is_hungry(&state.params) {
            next.push(herbivore);
            continue;
        }

        if herbivore.is_starved(&state.params) {
            state.physics.remove_body(herbivore.body)?;
            debug!("{} starved after {} feedings", herbivore.id, herbivore.feeded);
            report.deaths += 1;
            continue;
        }

        let child = forage(&mut state, &mut herbivore, &mut report)?;
        next.push(herbivore);
        next.extend(child);
    }

    state.herbivores = next;

    let interval = state.params.stats_interval;
    if interval > 0 && state.tick % interval == 0 {
        info!(
            "tick {} ({:.1}s): {} herbivores, {} food",
            state.tick,
            state.elapsed(),
            state.herbivores.len(),
            state.foods.len()
        );
    }

    Ok((state, report))
}

// Steer a hungry herbivore and feed it on contact; returns a newborn child
fn forage<P: PhysicsWorld>(
    state: &mut SimulationState<P>,
    herbivore: &mut Herbivore,
    report: &mut TickReport,
) -> Result<Option<Herbivore>> {
    let position = state.physics.position(herbivore.body)?;
    let nearest = find_nearest_food(position, herbivore.color, &state.foods, &state.physics)?;
    herbivore.target = nearest.target;

    let Some(index) = nearest
        .target
        .and_then(|id| state.foods.iter().position(|f| f.id == id))
    else {
        return Ok(None);
    };
    let target_body = state.foods[index].body;

    let heading = state.physics.position(target_body)? - position;
    let direction = if heading.length() > 0.0 {
        heading.normalize()
    } else {
        Vec2::ZERO
    };
    state
        .physics
        .set_velocity(herbivore.body, direction * approach_speed(nearest.color_distance))?;

    if !state.physics.collides(herbivore.body, target_body)? {
        return Ok(None);
    }

    herbivore.feed();
    report.feedings += 1;

    let food = &mut state.foods[index];
    let scale = food.consume();
    state.physics.scale(target_body, scale, scale)?;

    if food.is_depleted() {
        let replacement = state.factory.mutate_food(&mut state.physics, &mut state.rng, food)?;
        state.physics.remove_body(target_body)?;
        debug!("{} depleted, replaced by {}", food.id, replacement.id);

        *food = replacement;
        herbivore.target = None;
        report.replenished += 1;
    }

    if herbivore.should_reproduce(state.params.reproduction_interval) {
        let child = state
            .factory
            .mutate_herbivore(&mut state.physics, &mut state.rng, herbivore)?;
        report.births += 1;
        return Ok(Some(child));
    }

    Ok(None)
}

/// Totals over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed: f64,
    pub initial_population: usize,
    pub population: usize,
    pub peak_population: usize,
    pub foods: usize,
    pub births: usize,
    pub deaths: usize,
    pub feedings: usize,
    pub replenished: usize,
}

impl RunSummary {
    pub fn new<P: PhysicsWorld>(state: &SimulationState<P>) -> Self {
        Self {
            ticks: state.tick,
            elapsed: state.elapsed(),
            initial_population: state.population(),
            population: state.population(),
            peak_population: state.population(),
            foods: state.foods.len(),
            ..Self::default()
        }
    }

    pub fn record<P: PhysicsWorld>(&mut self, report: &TickReport, state: &SimulationState<P>) {
        self.ticks = state.tick;
        self.elapsed = state.elapsed();
        self.population = state.population();
        self.peak_population = self.peak_population.max(self.population);
        self.foods = state.foods.len();
        self.births += report.births;
        self.deaths += report.deaths;
        self.feedings += report.feedings;
        self.replenished += report.replenished;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Summary ===")?;
        writeln!(f, "Ticks: {} ({:.2}s simulated)", self.ticks, self.elapsed)?;
        writeln!(
            f,
            "Population: {} -> {} (peak {})",
            self.initial_population, self.population, self.peak_population
        )?;
        writeln!(f, "Births: {}, deaths: {}", self.births, self.deaths)?;
        writeln!(f, "Feedings: {}, food replaced: {}", self.feedings, self.replenished)?;
        writeln!(f, "Food items: {}", self.foods)?;
        Ok(())
    }
}

/// Run without pacing until the duration is reached or `max_ticks` have run
pub fn run_headless<P: PhysicsWorld>(
    mut state: SimulationState<P>,
    max_ticks: Option<u64>,
) -> Result<(SimulationState<P>, RunSummary)> {
    let mut summary = RunSummary::new(&state);
    let limit = max_ticks.unwrap_or(u64::MAX);
    let mut ran = 0;

    while !state.is_finished() && ran < limit {
        let (next, report) = step(state)?;
        state = next;
        summary.record(&report, &state);
        ran += 1;
    }

    info!(
        "Run stopped at tick {} with {} herbivores",
        state.tick,
        state.population()
    );
    Ok((state, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nannou::prelude::vec2;

    const GREEN: Color = Color::new(0x11, 0xdd, 0x11);
    const RED: Color = Color::new(0xdd, 0x11, 0x11);

    fn empty_state() -> SimulationState {
        SimulationState::empty(SimulationParams::default(), ArenaPhysics::new(), 1).unwrap()
    }

    // A hungry herbivore sitting on a food of its own color
    fn feeding_scene(hungry: u32, feeded: u32, amount: u32) -> (SimulationState, EntityId, EntityId) {
        let mut state = empty_state();
        let food = state.spawn_food(Some(GREEN), Some(vec2(300.0, 300.0))).unwrap();
        let herbivore = state.spawn_herbivore(Some(GREEN), Some(vec2(300.0, 300.0)));

        let h = state.herbivore_mut(herbivore).unwrap();
        h.hungry = hungry;
        h.feeded = feeded;
        state.food_mut(food).unwrap().amount = amount;

        (state, herbivore, food)
    }

    #[test]
    fn test_populated_world_matches_params() {
        let state = SimulationState::with_seed(SimulationParams::default(), 9).unwrap();

        assert_eq!(state.population(), 60);
        assert_eq!(state.foods.len(), 2);
        assert_ne!(state.foods[0].color, state.foods[1].color);
        // 60 herbivores, 2 food and the walls
        assert_eq!(state.physics.body_count(), 63);
    }

    #[test]
    fn test_too_much_food_for_the_palette_fails() {
        let mut params = SimulationParams::default();
        params.initial_food = 4;
        assert!(SimulationState::with_seed(params, 9).is_err());
    }

    #[test]
    fn test_satiated_herbivore_is_left_alone() {
        let mut state = empty_state();
        let id = state.spawn_herbivore(None, Some(vec2(100.0, 100.0)));
        state.spawn_food(None, Some(vec2(400.0, 400.0))).unwrap();

        let (state, report) = step(state).unwrap();
        let h = state.herbivore(id).unwrap();

        assert_eq!(h.hungry, 1);
        assert_eq!(h.target, None);
        assert_eq!(state.physics.velocity(h.body).unwrap(), Vec2::ZERO);
        assert_eq!(report, TickReport { tick: 1, ..TickReport::default() });
    }

    #[test]
    fn test_hungry_herbivore_heads_for_food() {
        let mut state = empty_state();
        let id = state.spawn_herbivore(None, Some(vec2(100.0, 300.0)));
        let food = state.spawn_food(Some(RED), Some(vec2(400.0, 300.0))).unwrap();
        state.herbivore_mut(id).unwrap().hungry = 40;

        let (state, _) = step(state).unwrap();
        let h = state.herbivore(id).unwrap();
        let velocity = state.physics.velocity(h.body).unwrap();

        // #999999 against #dd1111 is exactly 204 apart
        let distance = crate::color::color_distance(h.color, RED);
        assert_eq!(distance, 204.0);

        assert_eq!(h.target, Some(food));
        assert!((velocity.x - 1.0 / (1.0 + 204.0 / 100.0)).abs() < 1e-6);
        assert!(velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_later_herbivore_sees_replacement_in_same_tick() {
        let (mut state, first, food) = feeding_scene(100, 1, 1);
        let second = state.spawn_herbivore(Some(GREEN), Some(vec2(300.0, 300.0)));
        state.herbivore_mut(second).unwrap().hungry = 100;

        let (state, report) = step(state).unwrap();
        let replacement = state.foods[0].id;

        assert_eq!(report.replenished, 1);
        assert_ne!(replacement, food);
        assert_eq!(state.herbivore(first).unwrap().target, None);
        assert_eq!(state.herbivore(second).unwrap().target, Some(replacement));
    }

    #[test]
    fn test_hungry_herbivore_without_food_holds_still() {
        let mut state = empty_state();
        let id = state.spawn_herbivore(None, Some(vec2(100.0, 300.0)));
        state.herbivore_mut(id).unwrap().hungry = 100;

        let (state, _) = step(state).unwrap();
        let h = state.herbivore(id).unwrap();
        assert_eq!(h.target, None);
        assert_eq!(state.physics.velocity(h.body).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_feeding_resets_hunger_and_takes_food() {
        let (state, herbivore, food) = feeding_scene(100, 1, 20);

        let (state, report) = step(state).unwrap();
        let h = state.herbivore(herbivore).unwrap();

        assert_eq!(h.hungry, 0);
        assert_eq!(h.feeded, 2);
        assert_eq!(h.target, Some(food));
        assert_eq!(state.food(food).unwrap().amount, 19);
        assert_eq!(report.feedings, 1);
    }

    #[test]
    fn test_depleted_food_is_replaced() {
        let (state, herbivore, food) = feeding_scene(100, 1, 1);
        let old_body = state.food(food).unwrap().body;

        let (state, report) = step(state).unwrap();

        assert_eq!(report.replenished, 1);
        assert_eq!(state.foods.len(), 1);
        assert!(state.food(food).is_none());
        assert!(!state.physics.contains(old_body));

        let replacement = &state.foods[0];
        assert_eq!(replacement.amount, state.params.food_amount);
        assert_eq!(replacement.color, GREEN);
        assert!(state.physics.contains(replacement.body));
        assert_eq!(state.herbivore(herbivore).unwrap().target, None);
    }

    #[test]
    fn test_fifth_feeding_spawns_one_child() {
        let (state, parent, _) = feeding_scene(100, 4, 20);

        let (state, report) = step(state).unwrap();

        assert_eq!(report.births, 1);
        assert_eq!(state.population(), 2);
        assert_eq!(state.herbivores[0].id, parent);
        assert_eq!(state.herbivores[0].feeded, 5);

        let child = &state.herbivores[1];
        assert_eq!((child.hungry, child.feeded, child.target), (0, 1, None));
        assert!(state.physics.contains(child.body));
    }

    #[test]
    fn test_starvation_is_exact() {
        let mut state = empty_state();
        let id = state.spawn_herbivore(None, Some(vec2(100.0, 100.0)));
        // 1200 ticks of 0.01s is exactly the 12s threshold
        state.herbivore_mut(id).unwrap().hungry = 1199;

        let (state, report) = step(state).unwrap();
        assert_eq!(report.deaths, 0);
        let body = state.herbivore(id).unwrap().body;

        let (state, report) = step(state).unwrap();
        assert_eq!(report.deaths, 1);
        assert!(state.herbivore(id).is_none());
        assert!(!state.physics.contains(body));
    }

    #[test]
    fn test_run_stops_at_duration() {
        let mut params = SimulationParams::default();
        params.duration = 0.5;
        params.initial_population = 5;
        let state = SimulationState::with_seed(params, 3).unwrap();

        let (state, summary) = run_headless(state, None).unwrap();
        assert_eq!(state.tick, 50);
        assert!(state.is_finished());
        assert_eq!(summary.ticks, 50);
        assert_eq!(summary.initial_population, 5);
    }

    #[test]
    fn test_run_honours_tick_limit() {
        let state = SimulationState::with_seed(SimulationParams::default(), 3).unwrap();
        let (state, summary) = run_headless(state, Some(25)).unwrap();

        assert_eq!(state.tick, 25);
        assert!(!state.is_finished());
        assert!(summary.to_string().contains("Ticks: 25"));
    }
}
