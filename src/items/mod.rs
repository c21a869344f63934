//! Item system

pub mod item;
pub mod inventory;
pub mod loot;

pub use item::{Consumable, Item, ItemId, ItemIdGen, ItemKind, ScrollEffect};
pub use inventory::{Equipment, Inventory};
pub use loot::{pickup, roll_drops, roll_floor_item};
