//! Item definitions
//!
//! Core item types and their effects. Items never change once rolled;
//! they only move between the floor, the pack and the equipment slots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique item ID for tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out item ids for a run. Saved with the run so ids stay unique
/// after a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIdGen {
    next: u64,
}

impl ItemIdGen {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }
}

impl Default for ItemIdGen {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot scroll effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollEffect {
    /// Damages every visible monster
    Fireball,
    /// Damages every visible monster
    Lightning,
    /// Restores all hit points
    Healing,
    /// +2 attack, permanently
    Strength,
    /// +2 defense, permanently
    Shield,
    /// Reveals the whole level
    Mapping,
}

impl ScrollEffect {
    pub const ALL: [ScrollEffect; 6] = [
        ScrollEffect::Fireball,
        ScrollEffect::Lightning,
        ScrollEffect::Healing,
        ScrollEffect::Strength,
        ScrollEffect::Shield,
        ScrollEffect::Mapping,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScrollEffect::Fireball => "fireball",
            ScrollEffect::Lightning => "lightning",
            ScrollEffect::Healing => "healing",
            ScrollEffect::Strength => "strength",
            ScrollEffect::Shield => "shield",
            ScrollEffect::Mapping => "mapping",
        }
    }

    pub fn is_damaging(&self) -> bool {
        matches!(self, ScrollEffect::Fireball | ScrollEffect::Lightning)
    }
}

/// Things that are used up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consumable {
    Potion { heal: i32 },
    Scroll(ScrollEffect),
}

/// What an item is and what it does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon { attack_bonus: i32 },
    Armor { defense_bonus: i32 },
    Consumable(Consumable),
    /// Goes straight to the purse on pickup
    Gold { amount: u32 },
}

/// A single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, kind: ItemKind) -> Self {
        Self { id, name: name.into(), kind }
    }

    pub fn is_equippable(&self) -> bool {
        matches!(self.kind, ItemKind::Weapon { .. } | ItemKind::Armor { .. })
    }

    pub fn is_gold(&self) -> bool {
        matches!(self.kind, ItemKind::Gold { .. })
    }

    pub fn glyph(&self) -> char {
        match self.kind {
            ItemKind::Weapon { .. } => ')',
            ItemKind::Armor { .. } => '[',
            ItemKind::Consumable(Consumable::Potion { .. }) => '!',
            ItemKind::Consumable(Consumable::Scroll(_)) => '?',
            ItemKind::Gold { .. } => '$',
        }
    }

    /// Short description for the message log and inventory listing
    pub fn describe(&self) -> String {
        match self.kind {
            ItemKind::Weapon { attack_bonus } => format!("{} (ATK +{})", self.name, attack_bonus),
            ItemKind::Armor { defense_bonus } => format!("{} (DEF +{})", self.name, defense_bonus),
            ItemKind::Consumable(Consumable::Potion { heal }) => format!("{} (+{} HP)", self.name, heal),
            ItemKind::Consumable(Consumable::Scroll(_)) | ItemKind::Gold { .. } => self.name.clone(),
        }
    }
}

// =============================================================================
// Item Templates
// =============================================================================

pub mod templates {
    use super::*;

    /// Weapon tiers, weakest first
    pub const WEAPONS: [(&str, i32); 7] = [
        ("rusty dagger", 2),
        ("short sword", 4),
        ("mace", 6),
        ("long sword", 8),
        ("battle axe", 10),
        ("war hammer", 12),
        ("enchanted blade", 15),
    ];

    /// Armour tiers, weakest first
    pub const ARMOR: [(&str, i32); 6] = [
        ("leather jerkin", 1),
        ("studded leather", 2),
        ("ring mail", 3),
        ("scale mail", 4),
        ("chain mail", 5),
        ("plate armour", 6),
    ];

    pub fn potion(id: ItemId, heal: i32) -> Item {
        Item::new(id, "healing potion", ItemKind::Consumable(Consumable::Potion { heal }))
    }

    pub fn scroll(id: ItemId, effect: ScrollEffect) -> Item {
        Item::new(id, format!("scroll of {}", effect.name()), ItemKind::Consumable(Consumable::Scroll(effect)))
    }

    pub fn gold(id: ItemId, amount: u32) -> Item {
        Item::new(id, format!("{} gold", amount), ItemKind::Gold { amount })
    }

    /// Weapon of the given tier, clamped to the strongest
    pub fn weapon(id: ItemId, tier: usize) -> Item {
        let (name, attack_bonus) = WEAPONS[tier.min(WEAPONS.len() - 1)];
        Item::new(id, name, ItemKind::Weapon { attack_bonus })
    }

    /// Armour of the given tier, clamped to the strongest
    pub fn armor(id: ItemId, tier: usize) -> Item {
        let (name, defense_bonus) = ARMOR[tier.min(ARMOR.len() - 1)];
        Item::new(id, name, ItemKind::Armor { defense_bonus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids = ItemIdGen::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(b, ItemId(2));
    }

    #[test]
    fn test_tiers_clamp() {
        let blade = templates::weapon(ItemId(1), 99);
        assert_eq!(blade.kind, ItemKind::Weapon { attack_bonus: 15 });
        assert_eq!(blade.name, "enchanted blade");
        let plate = templates::armor(ItemId(2), 99);
        assert_eq!(plate.kind, ItemKind::Armor { defense_bonus: 6 });
    }

    #[test]
    fn test_describe() {
        assert_eq!(templates::potion(ItemId(1), 12).describe(), "healing potion (+12 HP)");
        assert_eq!(templates::scroll(ItemId(2), ScrollEffect::Mapping).describe(), "scroll of mapping");
        assert!(templates::gold(ItemId(3), 9).is_gold());
    }
}
