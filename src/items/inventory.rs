//! Inventory system
//!
//! The player's pack, purse and the two equipment slots. The pack has no
//! capacity limit and items never stack; every item keeps its own id.

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId, ItemKind};

/// Player inventory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Items in pickup order
    items: Vec<Item>,
    /// Gold currency
    gold: u32,
}

impl Inventory {
    /// Create a new inventory
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            gold: 0,
        }
    }

    /// Get current number of items
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item; gold goes into the purse instead of the pack
    pub fn add_item(&mut self, item: Item) {
        match item.kind {
            ItemKind::Gold { amount } => self.add_gold(amount),
            _ => self.items.push(item),
        }
    }

    /// Remove an item by ID
    pub fn remove_by_id(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Get item by ID
    pub fn get_by_id(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Get all items
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get current gold
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Add gold
    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Pay `amount` out of the purse. Nothing is taken if it falls short.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(left) => {
                self.gold = left;
                true
            }
            None => false,
        }
    }
}

/// Weapon and armour slots
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Equipment {
    weapon: Option<Item>,
    armor: Option<Item>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip an item, returning the previously equipped item if any.
    /// Items that are not weapons or armour are handed straight back.
    pub fn equip(&mut self, item: Item) -> Option<Item> {
        match item.kind {
            ItemKind::Weapon { .. } => self.weapon.replace(item),
            ItemKind::Armor { .. } => self.armor.replace(item),
            _ => Some(item),
        }
    }

    pub fn weapon(&self) -> Option<&Item> {
        self.weapon.as_ref()
    }

    pub fn armor(&self) -> Option<&Item> {
        self.armor.as_ref()
    }

    /// Whether wearing `item` beats what fills its slot now
    pub fn is_upgrade(&self, item: &Item) -> bool {
        if !item.is_equippable() {
            return false;
        }
        match item.kind {
            ItemKind::Weapon { attack_bonus } => attack_bonus > self.attack_bonus(),
            ItemKind::Armor { defense_bonus } => defense_bonus > self.defense_bonus(),
            _ => false,
        }
    }

    /// Attack bonus of the equipped weapon
    pub fn attack_bonus(&self) -> i32 {
        match self.weapon.as_ref().map(|item| item.kind) {
            Some(ItemKind::Weapon { attack_bonus }) => attack_bonus,
            _ => 0,
        }
    }

    /// Defense bonus of the equipped armour
    pub fn defense_bonus(&self) -> i32 {
        match self.armor.as_ref().map(|item| item.kind) {
            Some(ItemKind::Armor { defense_bonus }) => defense_bonus,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::item::templates;

    #[test]
    fn test_gold_goes_to_purse() {
        let mut inv = Inventory::new();
        inv.add_item(templates::gold(ItemId(1), 12));
        inv.add_item(templates::potion(ItemId(2), 8));
        assert_eq!(inv.gold(), 12);
        assert_eq!(inv.count(), 1);
    }

    #[test]
    fn test_identical_items_do_not_stack() {
        let mut inv = Inventory::new();
        inv.add_item(templates::potion(ItemId(1), 10));
        inv.add_item(templates::potion(ItemId(2), 10));
        assert_eq!(inv.count(), 2);
        assert!(inv.remove_by_id(ItemId(1)).is_some());
        assert!(inv.remove_by_id(ItemId(1)).is_none());
        assert!(inv.contains(ItemId(2)));
    }

    #[test]
    fn test_equip_swaps() {
        let mut eq = Equipment::new();
        assert_eq!(eq.equip(templates::weapon(ItemId(1), 0)), None);
        assert_eq!(eq.attack_bonus(), 2);

        let old = eq.equip(templates::weapon(ItemId(2), 3)).unwrap();
        assert_eq!(old.id, ItemId(1));
        assert_eq!(eq.attack_bonus(), 8);

        eq.equip(templates::armor(ItemId(3), 1));
        assert_eq!(eq.defense_bonus(), 2);

        let potion = templates::potion(ItemId(4), 5);
        assert_eq!(eq.equip(potion.clone()), Some(potion));
    }

    #[test]
    fn test_spend_gold_never_overdraws() {
        let mut inv = Inventory::new();
        inv.add_gold(30);
        assert!(!inv.spend_gold(31));
        assert_eq!(inv.gold(), 30);
        assert!(inv.spend_gold(30));
        assert_eq!(inv.gold(), 0);
    }

    #[test]
    fn test_upgrade_compares_slot() {
        let mut eq = Equipment::new();
        assert!(eq.is_upgrade(&templates::weapon(ItemId(1), 0)));
        eq.equip(templates::weapon(ItemId(1), 2));
        assert!(!eq.is_upgrade(&templates::weapon(ItemId(2), 1)));
        assert!(eq.is_upgrade(&templates::weapon(ItemId(3), 3)));
        assert!(eq.is_upgrade(&templates::armor(ItemId(4), 0)));
        assert!(!eq.is_upgrade(&templates::potion(ItemId(5), 10)));
    }
}
