//! Combat system

pub mod damage;
pub mod resolver;

pub use damage::{hit_chance, roll_attack, roll_damage, AttackRoll};
pub use resolver::{apply_attack, apply_damage, resolve_attack, AttackOutcome, CombatContext, Combatant};
