/*
 * Herbivore Arena - Module Definitions
 *
 * This file defines the module structure for the herbivore simulation.
 * The simulation core (color, factory, foraging, simulation) is independent
 * of the window; the app, renderer, ui and input modules drive it with nannou.
 */

// Re-export key components for easier access
pub use color::{Color, Palette, PaletteMode};
pub use error::{ConfigurationError, SimulationError};
pub use factory::{EntityFactory, EntityId};
pub use food::Food;
pub use foraging::{find_nearest_food, Forage};
pub use herbivore::Herbivore;
pub use params::SimulationParams;
pub use physics::{ArenaPhysics, BodyHandle, PhysicsError, PhysicsWorld};
pub use simulation::{run_headless, step, RunSummary, SimulationState, TickReport};
pub use debug::DebugInfo;
pub use app::Model;

// Define modules
pub mod color;
pub mod error;
pub mod factory;
pub mod food;
pub mod foraging;
pub mod herbivore;
pub mod params;
pub mod physics;
pub mod simulation;
pub mod debug;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;

// Default tunables, see SimulationParams for the overridable copies
pub const WORLD_SIZE: f32 = 600.0;
pub const STEP_SIZE: f64 = 1.0 / 100.0;
pub const HERBIVORE_SIZE: f32 = 10.0;
pub const HERBIVORE_COLOR: Color = Color::new(0x99, 0x99, 0x99);
pub const FOOD_AMOUNT: u32 = 20;
