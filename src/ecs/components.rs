//! ECS Components
//!
//! All components stored on entities in the level's registry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::MonsterKind;
use crate::items::Item;

// ============================================================================
// Identity
// ============================================================================

/// Stable entity id, unique within a run and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name component for entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// What an entity is. Players and monsters are actors (they take turns
/// and take damage); item piles just lie on the floor, and the merchant
/// stands in place and trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Monster(MonsterKind),
    ItemPile,
    Merchant,
}

impl Role {
    /// Can act and take damage
    pub fn is_actor(&self) -> bool {
        matches!(self, Role::Player | Role::Monster(_))
    }

    pub fn is_monster(&self) -> bool {
        matches!(self, Role::Monster(_))
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, Role::Monster(kind) if kind.is_boss())
    }

    pub fn glyph(&self) -> char {
        match self {
            Role::Player => '@',
            Role::Monster(kind) => kind.def().glyph,
            Role::ItemPile => '*',
            Role::Merchant => 'M',
        }
    }
}

// ============================================================================
// Position & Movement
// ============================================================================

/// Position in the level grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position
    pub fn distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Neighbouring cell in the given direction
    pub fn offset(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Touching, diagonals included
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self != other && self.chebyshev_distance(other) <= 1
    }

    /// Direction of a step from here towards an adjacent cell
    pub fn direction_to(&self, other: &Position) -> Option<Direction> {
        Direction::from_delta((other.x - self.x).signum(), (other.y - self.y).signum())
    }
}

/// The eight compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Grid delta; y grows downwards
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }
}

// ============================================================================
// Combat Stats
// ============================================================================

/// Health pool, always within [0, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Apply damage, returning how much was actually taken
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    /// Heal, returning how much was actually restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.max - self.current);
        self.current += actual;
        actual
    }

    pub fn heal_full(&mut self) {
        self.current = self.max;
    }

    /// Raise the maximum; current rises by the same amount
    pub fn raise_max(&mut self, amount: i32) {
        let amount = amount.max(0);
        self.max = self.max.saturating_add(amount);
        self.current = self.current.saturating_add(amount).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// Attack and defense ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: i32,
    pub defense: i32,
}

impl CombatStats {
    pub fn new(attack: i32, defense: i32) -> Self {
        Self { attack, defense }
    }

    /// Stats with flat bonuses added (equipment)
    pub fn with_bonus(&self, attack: i32, defense: i32) -> Self {
        Self::new(self.attack + attack, self.defense + defense)
    }
}

/// Speed; higher acts earlier within the monster phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Initiative(pub i32);

/// Experience granted to whoever kills this entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XpReward(pub u32);

// ============================================================================
// Items on the floor
// ============================================================================

/// The floor-drop list of one tile
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemPile {
    pub items: Vec<Item>,
}

// ============================================================================
// Trade
// ============================================================================

/// One item on the merchant's table and what it costs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub item: Item,
    pub price: u32,
}

/// Everything a merchant still has for sale, in display order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stock {
    pub offers: Vec<Offer>,
}

// ============================================================================
// AI
// ============================================================================

/// What a monster was doing on its last turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AIState {
    #[default]
    Idle,
    Wander,
    Chase,
    Attack,
}
