/*
 * Error Module
 *
 * Errors raised by the simulation core. Foraging with no food and positions
 * pushed past the arena edge are not errors; both are handled by the rule.
 */

use thiserror::Error;

use crate::physics::PhysicsError;

/// Errors produced while building or stepping a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The parameters cannot produce a valid world.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A hex string that is not `#rgb` or `#rrggbb`.
    #[error("invalid color {0:?}: expected #rgb or #rrggbb")]
    InvalidColor(String),
    /// The physics world rejected a command.
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameter file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Invalid or exhausted configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Every palette color has been handed out and the palette does not cycle.
    #[error("food color palette exhausted after {allocated} allocations")]
    PaletteExhausted { allocated: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
