//! Monster roster
//!
//! Nine monster kinds ordered by tier. The first eight roam every level;
//! the dragon only ever appears once, in the lair at the bottom.

use serde::{Deserialize, Serialize};

use crate::ecs::{ActorSpec, CombatStats, Health, Role};
use crate::progression::DepthScaling;

/// Monster definition with base stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterDef {
    pub name: &'static str,
    pub glyph: char,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    /// Initiative; higher acts earlier
    pub speed: i32,
    pub xp: u32,
}

pub const RAT: MonsterDef = MonsterDef { name: "rat", glyph: 'r', hp: 6, attack: 2, defense: 0, speed: 12, xp: 5 };
pub const SNAKE: MonsterDef = MonsterDef { name: "snake", glyph: 's', hp: 8, attack: 3, defense: 0, speed: 11, xp: 8 };
pub const GOBLIN: MonsterDef = MonsterDef { name: "goblin", glyph: 'g', hp: 12, attack: 4, defense: 1, speed: 10, xp: 12 };
pub const KOBOLD: MonsterDef = MonsterDef { name: "kobold", glyph: 'k', hp: 15, attack: 5, defense: 1, speed: 10, xp: 16 };
pub const ORC: MonsterDef = MonsterDef { name: "orc", glyph: 'o', hp: 22, attack: 7, defense: 2, speed: 9, xp: 25 };
pub const SKELETON: MonsterDef = MonsterDef { name: "skeleton", glyph: 'S', hp: 20, attack: 6, defense: 3, speed: 8, xp: 22 };
pub const TROLL: MonsterDef = MonsterDef { name: "troll", glyph: 'T', hp: 35, attack: 9, defense: 3, speed: 7, xp: 40 };
pub const WRAITH: MonsterDef = MonsterDef { name: "wraith", glyph: 'W', hp: 28, attack: 11, defense: 2, speed: 12, xp: 50 };
pub const DRAGON: MonsterDef = MonsterDef { name: "dragon", glyph: 'D', hp: 60, attack: 15, defense: 5, speed: 10, xp: 100 };

/// Every monster kind, by tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Rat,
    Snake,
    Goblin,
    Kobold,
    Orc,
    Skeleton,
    Troll,
    Wraith,
    Dragon,
}

impl MonsterKind {
    /// Kinds that spawn as regular level population, weakest first
    pub const ROAMING: [MonsterKind; 8] = [
        MonsterKind::Rat,
        MonsterKind::Snake,
        MonsterKind::Goblin,
        MonsterKind::Kobold,
        MonsterKind::Orc,
        MonsterKind::Skeleton,
        MonsterKind::Troll,
        MonsterKind::Wraith,
    ];

    pub fn def(&self) -> &'static MonsterDef {
        match self {
            MonsterKind::Rat => &RAT,
            MonsterKind::Snake => &SNAKE,
            MonsterKind::Goblin => &GOBLIN,
            MonsterKind::Kobold => &KOBOLD,
            MonsterKind::Orc => &ORC,
            MonsterKind::Skeleton => &SKELETON,
            MonsterKind::Troll => &TROLL,
            MonsterKind::Wraith => &WRAITH,
            MonsterKind::Dragon => &DRAGON,
        }
    }

    pub fn is_boss(&self) -> bool {
        *self == MonsterKind::Dragon
    }

    /// Roaming kind for a tier index, clamped to the strongest roamer
    pub fn from_tier(tier: usize) -> MonsterKind {
        Self::ROAMING[tier.min(Self::ROAMING.len() - 1)]
    }

    /// Spawn spec with depth scaling applied to hit points and attack
    pub fn actor_spec(&self, scaling: &DepthScaling) -> ActorSpec {
        let def = self.def();
        ActorSpec {
            role: Role::Monster(*self),
            name: def.name.to_string(),
            health: Health::new(scaling.scale_hp(def.hp)),
            stats: CombatStats::new(scaling.scale_attack(def.attack), def.defense),
            initiative: def.speed,
            xp_reward: def.xp,
        }
    }
}
