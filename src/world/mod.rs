//! World module
//!
//! Contains map data structures, tiles, field of view, and procedural generation.

pub mod map;
pub mod tile;
pub mod fov;
pub mod generation;

pub use map::{LevelMap, Room};
pub use tile::TileType;
pub use fov::{compute_visible, has_line_of_sight, Visibility};
pub use generation::generate;
