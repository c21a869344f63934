//! Entity creation and management

pub mod player;
pub mod monsters;
pub mod spawner;

pub use player::{player_spec, spawn_player};
pub use monsters::{MonsterDef, MonsterKind};
pub use spawner::{populate_level, roll_merchant_stock, Population};
