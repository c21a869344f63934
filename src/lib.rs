//! Depthcrawl - turn-based dungeon crawling simulation core
//!
//! Eight procedurally generated levels, a dragon waiting at the bottom,
//! and a strictly sequential turn loop in between. Rendering, input and
//! process setup live outside this crate; they drive [`TurnScheduler`]
//! one [`PlayerAction`] at a time and read back a [`RenderSnapshot`].

pub mod config;
pub mod error;
pub mod game;
pub mod ecs;
pub mod world;
pub mod entities;
pub mod combat;
pub mod items;
pub mod progression;
pub mod save;

/// Deterministic RNG used for every random decision in a run
pub type GameRng = rand_chacha::ChaCha8Rng;

/// Deepest level of the dungeon; the boss lives here
pub const MAX_DEPTH: u32 = 8;

// Re-export commonly used types
pub use config::GameConfig;
pub use error::{ActionError, ConfigError, GameError, GenerationError};
pub use game::{ActionResult, GameState, Outcome, PlayerAction, RenderSnapshot, TurnPhase, TurnReport, TurnScheduler};
pub use save::{SaveData, SaveError};
pub use ecs::components::*;
pub use world::map::LevelMap;
