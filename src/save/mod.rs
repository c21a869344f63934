//! Save/load system
//!
//! Serialisable snapshot of a whole run, for a persistence layer to store.

pub mod save_game;

pub use save_game::{SaveData, SaveError, SAVE_VERSION};
