//! Tile definitions
//!
//! Level geometry is a grid of [`TileType`]. Tiles never change after
//! generation except for doors swinging open.

use serde::{Deserialize, Serialize};

/// Types of tiles in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Wall,
    Floor,
    DoorClosed,
    DoorOpen,
    StairsUp,
    StairsDown,
}

impl TileType {
    /// Can be stood on right now
    pub fn is_walkable(&self) -> bool {
        matches!(
            self,
            TileType::Floor | TileType::DoorOpen | TileType::StairsUp | TileType::StairsDown
        )
    }

    /// Walkable, or becomes walkable once opened. Connectivity is judged
    /// on this.
    pub fn is_passable(&self) -> bool {
        self.is_walkable() || *self == TileType::DoorClosed
    }

    pub fn is_transparent(&self) -> bool {
        !matches!(self, TileType::Wall | TileType::DoorClosed)
    }

    pub fn glyph(&self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
            TileType::DoorClosed => '+',
            TileType::DoorOpen => '/',
            TileType::StairsUp => '<',
            TileType::StairsDown => '>',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_door_blocks_but_is_passable() {
        assert!(!TileType::DoorClosed.is_walkable());
        assert!(!TileType::DoorClosed.is_transparent());
        assert!(TileType::DoorClosed.is_passable());
        assert!(TileType::DoorOpen.is_walkable());
        assert!(TileType::DoorOpen.is_transparent());
    }

    #[test]
    fn test_walls_block_everything() {
        assert!(!TileType::Wall.is_walkable());
        assert!(!TileType::Wall.is_passable());
        assert!(!TileType::Wall.is_transparent());
    }
}
