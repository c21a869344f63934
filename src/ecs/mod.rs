//! Entity Component System module
//!
//! Components, the per-level registry, and monster AI.

pub mod components;
pub mod registry;
pub mod systems;

pub use components::*;
pub use registry::{ActorSpec, EntityRecord, EntityRegistry, RecordKind};
pub use systems::{decide_monster_action, MonsterAction};
