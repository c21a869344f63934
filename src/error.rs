//! Error types
//!
//! Everything the core can refuse or fail at, grouped by the caller that
//! has to deal with it.

use thiserror::Error;

use crate::ecs::{EntityId, Position};
use crate::items::ItemId;

/// Level generation could not produce a playable layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("no connected layout with enough rooms for depth {depth} after {attempts} attempts")]
    NoConnectedLayout { depth: u32, attempts: u32 },
}

/// Registry bookkeeping failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("cell ({}, {}) is already occupied", .0.x, .0.y)]
    Occupied(Position),

    #[error("no live entity with id {0}")]
    UnknownEntity(EntityId),
}

/// A player action rejected before anything changed.
///
/// Rejected actions never consume the turn. Actions that are legal to
/// attempt but fail in the world (bumping a wall, swinging at an empty
/// square) are not errors; they resolve as no-ops that end the turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the run is over")]
    RunOver,

    #[error("no item with id {0} in the inventory")]
    NoSuchItem(ItemId),

    #[error("there are no stairs here")]
    NotOnStairs,

    #[error("there is no merchant next to you")]
    NoMerchant,

    #[error("the merchant has no offer {0}")]
    NoSuchOffer(usize),

    #[error("you can't afford that ({price} gold, you have {gold})")]
    CannotAfford { price: u32, gold: u32 },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Failures while starting a run or entering a new depth
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("cannot descend below depth {0}")]
    BottomReached(u32),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}
