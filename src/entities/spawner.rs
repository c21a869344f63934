//! Level population
//!
//! Places the player on the up stairs, scatters depth-scaled monsters
//! through every room but the first, drops floor loot, and at the bottom
//! puts the boss in its lair. Levels with a middle room also get a
//! merchant standing in the centre of one.

use rand::seq::SliceRandom;
use rand::Rng;

use super::monsters::MonsterKind;
use super::player::spawn_player;
use crate::ecs::{ActorSpec, EntityId, EntityRegistry, Offer, Position};
use crate::error::RegistryError;
use crate::items::item::templates;
use crate::items::{roll_floor_item, ItemIdGen, ItemKind, ScrollEffect};
use crate::progression::DepthScaling;
use crate::world::{LevelMap, TileType};
use crate::MAX_DEPTH;

/// What ended up on a freshly populated level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub player: EntityId,
    pub monsters: usize,
    pub items: usize,
    pub boss: Option<EntityId>,
    pub merchant: Option<EntityId>,
}

/// Roll a merchant's table: one or two potions, one weapon, one or two
/// scrolls
pub fn roll_merchant_stock(scaling: &DepthScaling, ids: &mut ItemIdGen, rng: &mut impl Rng) -> Vec<Offer> {
    let mut offers = Vec::new();

    for _ in 0..rng.gen_range(1..=2) {
        let heal = rng.gen_range(scaling.merchant_potion_heal());
        let price = rng.gen_range(15..=25);
        offers.push(Offer { item: templates::potion(ids.next_id(), heal), price });
    }

    let tier = rng.gen_range(0..=scaling.merchant_weapon_tier());
    let weapon = templates::weapon(ids.next_id(), tier);
    let price = match weapon.kind {
        ItemKind::Weapon { attack_bonus } => 20 + attack_bonus.max(0) as u32 * 3,
        _ => 20,
    };
    offers.push(Offer { item: weapon, price });

    for _ in 0..rng.gen_range(1..=2) {
        let effect = ScrollEffect::ALL[rng.gen_range(0..ScrollEffect::ALL.len())];
        let price = rng.gen_range(30..=50);
        offers.push(Offer { item: templates::scroll(ids.next_id(), effect), price });
    }
    offers
}

/// Populate an empty registry for `map`
pub fn populate_level(
    registry: &mut EntityRegistry,
    map: &LevelMap,
    player: ActorSpec,
    ids: &mut ItemIdGen,
    rng: &mut impl Rng,
) -> Result<Population, RegistryError> {
    let scaling = DepthScaling::new(map.depth);
    let player = spawn_player(registry, map.stairs_up, player)?;

    // The boss claims its lair before anything else can
    let boss = if map.depth >= MAX_DEPTH {
        let spec = MonsterKind::Dragon.actor_spec(&scaling);
        let id = registry.spawn_actor(spec, map.lair)?;
        log::info!("The dragon waits at ({}, {})", map.lair.x, map.lair.y);
        Some(id)
    } else {
        None
    };

    // The merchant keeps shop in a middle room, never the lair
    let merchant = if map.rooms.len() > 2 {
        let lair_room = map.room_containing(map.lair);
        let shops: Vec<Position> = (1..map.rooms.len() - 1)
            .filter(|idx| Some(*idx) != lair_room)
            .map(|idx| map.rooms[idx].center())
            .filter(|pos| map.tile(*pos) == Some(TileType::Floor) && !registry.is_occupied(*pos))
            .collect();
        match shops.choose(rng).copied() {
            Some(pos) => {
                let offers = roll_merchant_stock(&scaling, ids, rng);
                log::debug!("Merchant at ({}, {}) with {} offers", pos.x, pos.y, offers.len());
                Some(registry.spawn_merchant(offers, pos)?)
            }
            None => None,
        }
    } else {
        None
    };

    // Monster cells: plain floor in any room but the entrance, lair excluded
    let mut cells: Vec<Position> = map
        .rooms
        .iter()
        .skip(1)
        .flat_map(|room| room.cells())
        .filter(|pos| *pos != map.lair && map.tile(*pos) == Some(TileType::Floor))
        .filter(|pos| !registry.is_occupied(*pos))
        .collect();
    cells.shuffle(rng);

    let (min_count, max_count) = scaling.monster_count_range();
    let count = rng.gen_range(min_count..=max_count).min(cells.len());

    for pos in cells.iter().take(count) {
        let tier = rng.gen_range(0..=scaling.max_monster_tier());
        let kind = MonsterKind::from_tier(tier);
        registry.spawn_actor(kind.actor_spec(&scaling), *pos)?;
    }

    // Half the rooms get something on the floor
    let mut items = 0;
    for room in &map.rooms {
        if !rng.gen_bool(0.5) {
            continue;
        }
        let free: Vec<Position> = room
            .cells()
            .into_iter()
            .filter(|pos| map.tile(*pos) == Some(TileType::Floor) && !registry.is_occupied(*pos))
            .collect();
        if let Some(pos) = free.choose(rng) {
            let item = roll_floor_item(map.depth, ids, rng);
            registry.drop_items(*pos, vec![item])?;
            items += 1;
        }
    }

    log::info!(
        "Populated depth {}: {} monsters, {} floor items",
        map.depth,
        count,
        items
    );

    Ok(Population {
        player,
        monsters: count,
        items,
        boss,
        merchant,
    })
}
