//! Loot generation system
//!
//! Floor items rolled at level population, death drops, and pickup.

use rand::seq::SliceRandom;
use rand::Rng;

use super::inventory::Inventory;
use super::item::{templates, Item, ItemIdGen, ScrollEffect};
use crate::ecs::{EntityRegistry, Position, Role};
use crate::progression::DepthScaling;

/// Roll one item lying on the floor of a fresh level
pub fn roll_floor_item(depth: u32, ids: &mut ItemIdGen, rng: &mut impl Rng) -> Item {
    let scaling = DepthScaling::new(depth);
    let id = ids.next_id();
    let roll: f64 = rng.gen();

    if roll < 0.30 {
        templates::potion(id, rng.gen_range(8..=20))
    } else if roll < 0.50 {
        templates::weapon(id, rng.gen_range(0..=scaling.max_item_tier()))
    } else if roll < 0.62 {
        templates::armor(id, rng.gen_range(0..=scaling.max_item_tier()) / 2)
    } else if roll < 0.85 {
        templates::gold(id, rng.gen_range(5..=scaling.max_gold()))
    } else {
        let effect = *ScrollEffect::ALL.choose(rng).unwrap_or(&ScrollEffect::Healing);
        templates::scroll(id, effect)
    }
}

/// Items left behind by a slain actor, in drop order.
///
/// Regular monsters drop at most one item, more often deeper down. The
/// boss always leaves a hoard: gold plus two items.
pub fn roll_drops(role: Role, depth: u32, ids: &mut ItemIdGen, rng: &mut impl Rng) -> Vec<Item> {
    let scaling = DepthScaling::new(depth);
    match role {
        Role::Monster(kind) if kind.is_boss() => {
            let gold = rng.gen_range(50..=100) + scaling.max_gold();
            vec![
                templates::gold(ids.next_id(), gold),
                templates::weapon(ids.next_id(), scaling.max_item_tier()),
                roll_floor_item(depth, ids, rng),
            ]
        }
        Role::Monster(_) if rng.gen_bool(scaling.drop_chance()) => {
            vec![roll_floor_item(depth, ids, rng)]
        }
        _ => Vec::new(),
    }
}

/// Pick up everything lying at `at`, moving it into the inventory.
/// Returns the items taken, gold included.
pub fn pickup(registry: &mut EntityRegistry, inventory: &mut Inventory, at: Position) -> Vec<Item> {
    let items = registry.take_pile(at);
    for item in &items {
        inventory.add_item(item.clone());
    }
    if !items.is_empty() {
        log::debug!("Picked up {} item(s) at ({}, {})", items.len(), at.x, at.y);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MonsterKind;
    use crate::items::ItemKind;
    use rand::SeedableRng;

    #[test]
    fn test_boss_always_drops() {
        let mut ids = ItemIdGen::new();
        let mut rng = crate::GameRng::seed_from_u64(5);
        for _ in 0..20 {
            let drops = roll_drops(Role::Monster(MonsterKind::Dragon), 8, &mut ids, &mut rng);
            assert_eq!(drops.len(), 3);
            assert!(drops[0].is_gold());
        }
    }

    #[test]
    fn test_player_drops_nothing() {
        let mut ids = ItemIdGen::new();
        let mut rng = crate::GameRng::seed_from_u64(5);
        assert!(roll_drops(Role::Player, 3, &mut ids, &mut rng).is_empty());
    }

    #[test]
    fn test_monster_drop_rate_grows_with_depth() {
        let count = |depth| {
            let mut ids = ItemIdGen::new();
            let mut rng = crate::GameRng::seed_from_u64(11);
            (0..2000)
                .filter(|_| !roll_drops(Role::Monster(MonsterKind::Rat), depth, &mut ids, &mut rng).is_empty())
                .count()
        };
        let shallow = count(1);
        let deep = count(8);
        assert!(shallow > 500 && shallow < 800);
        assert!(deep > shallow);
    }

    #[test]
    fn test_floor_items_respect_depth() {
        let mut ids = ItemIdGen::new();
        let mut rng = crate::GameRng::seed_from_u64(9);
        for _ in 0..500 {
            match roll_floor_item(1, &mut ids, &mut rng).kind {
                ItemKind::Weapon { attack_bonus } => assert!(attack_bonus <= 4),
                ItemKind::Gold { amount } => assert!((5..=20).contains(&amount)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_pickup_moves_items() {
        let mut registry = EntityRegistry::new();
        let mut inventory = Inventory::new();
        let mut ids = ItemIdGen::new();
        let pos = Position::new(2, 2);
        registry
            .drop_items(pos, vec![templates::potion(ids.next_id(), 10), templates::gold(ids.next_id(), 30)])
            .unwrap();

        let taken = pickup(&mut registry, &mut inventory, pos);
        assert_eq!(taken.len(), 2);
        assert_eq!(inventory.count(), 1);
        assert_eq!(inventory.gold(), 30);
        assert!(registry.pile_at(pos).is_none());
        assert!(pickup(&mut registry, &mut inventory, pos).is_empty());
    }
}
