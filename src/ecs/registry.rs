//! Entity registry
//!
//! Owns every live entity of the current level. Backed by a `hecs::World`
//! plus two indexes: stable id -> hecs handle, and cell -> occupant. All
//! spawns and moves go through here, so no two entities can ever be
//! committed to the same cell.

use std::collections::HashMap;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::ecs::{
    AIState, CombatStats, EntityId, Health, Initiative, ItemPile, Name, Offer, Position, Role,
    Stock, XpReward,
};
use crate::error::RegistryError;
use crate::items::Item;

/// Everything needed to spawn (or respawn) an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    pub role: Role,
    pub name: String,
    pub health: Health,
    pub stats: CombatStats,
    pub initiative: i32,
    pub xp_reward: u32,
}

/// Flat, serializable view of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub position: Position,
    pub kind: RecordKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordKind {
    Actor(ActorSpec),
    Pile(Vec<Item>),
    Merchant(Vec<Offer>),
}

/// Registry of live entities on one level
pub struct EntityRegistry {
    world: World,
    handles: HashMap<EntityId, Entity>,
    occupancy: HashMap<Position, EntityId>,
    next_id: u64,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Registry whose next id is `next_id`; ids stay unique across levels
    /// when each new level continues from the previous counter
    pub fn starting_at(next_id: u64) -> Self {
        Self {
            world: World::new(),
            handles: HashMap::new(),
            occupancy: HashMap::new(),
            next_id: next_id.max(1),
        }
    }

    /// Id the next spawn will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn handle(&self, id: EntityId) -> Result<Entity, RegistryError> {
        self.handles
            .get(&id)
            .copied()
            .ok_or(RegistryError::UnknownEntity(id))
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawn an actor on a free cell
    pub fn spawn_actor(&mut self, spec: ActorSpec, pos: Position) -> Result<EntityId, RegistryError> {
        if self.occupancy.contains_key(&pos) {
            return Err(RegistryError::Occupied(pos));
        }
        let id = self.allocate_id();
        self.insert_actor(id, spec, pos);
        Ok(id)
    }

    fn insert_actor(&mut self, id: EntityId, spec: ActorSpec, pos: Position) {
        let entity = self.world.spawn((
            id,
            pos,
            spec.role,
            Name::new(spec.name),
            spec.health,
            spec.stats,
            Initiative(spec.initiative),
            XpReward(spec.xp_reward),
            AIState::Idle,
        ));
        self.handles.insert(id, entity);
        self.occupancy.insert(pos, id);
    }

    /// Put items on the floor. Merges into an existing pile on that cell;
    /// fails if an actor stands there.
    pub fn drop_items(&mut self, pos: Position, items: Vec<Item>) -> Result<Option<EntityId>, RegistryError> {
        if items.is_empty() {
            return Ok(None);
        }
        if let Some(pile_id) = self.pile_at(pos) {
            let entity = self.handle(pile_id)?;
            if let Ok(mut pile) = self.world.get::<&mut ItemPile>(entity) {
                pile.items.extend(items);
            }
            return Ok(Some(pile_id));
        }
        if self.occupancy.contains_key(&pos) {
            return Err(RegistryError::Occupied(pos));
        }
        let id = self.allocate_id();
        self.insert_pile(id, items, pos);
        Ok(Some(id))
    }

    fn insert_pile(&mut self, id: EntityId, items: Vec<Item>, pos: Position) {
        let entity = self.world.spawn((id, pos, Role::ItemPile, ItemPile { items }));
        self.handles.insert(id, entity);
        self.occupancy.insert(pos, id);
    }

    /// Put a merchant with its stock on a free cell
    pub fn spawn_merchant(&mut self, offers: Vec<Offer>, pos: Position) -> Result<EntityId, RegistryError> {
        if self.occupancy.contains_key(&pos) {
            return Err(RegistryError::Occupied(pos));
        }
        let id = self.allocate_id();
        self.insert_merchant(id, offers, pos);
        Ok(id)
    }

    fn insert_merchant(&mut self, id: EntityId, offers: Vec<Offer>, pos: Position) {
        let entity = self.world.spawn((
            id,
            pos,
            Role::Merchant,
            Name::new("Merchant"),
            Stock { offers },
        ));
        self.handles.insert(id, entity);
        self.occupancy.insert(pos, id);
    }

    // =========================================================================
    // Removal (death and pickup are the only ways out)
    // =========================================================================

    /// Remove an entity for good
    pub fn despawn(&mut self, id: EntityId) -> Result<Position, RegistryError> {
        let entity = self.handle(id)?;
        let pos = self.position(id).ok_or(RegistryError::UnknownEntity(id))?;
        let _ = self.world.despawn(entity);
        self.handles.remove(&id);
        if self.occupancy.get(&pos) == Some(&id) {
            self.occupancy.remove(&pos);
        }
        Ok(pos)
    }

    /// Take one offer off a merchant's table. Later offers shift down.
    pub fn take_offer(&mut self, id: EntityId, index: usize) -> Option<Offer> {
        let entity = self.handle(id).ok()?;
        let mut stock = self.world.get::<&mut Stock>(entity).ok()?;
        if index >= stock.offers.len() {
            return None;
        }
        Some(stock.offers.remove(index))
    }

    /// Remove the pile on a cell and hand over its items
    pub fn take_pile(&mut self, pos: Position) -> Vec<Item> {
        let Some(pile_id) = self.pile_at(pos) else {
            return Vec::new();
        };
        let items = self
            .handle(pile_id)
            .ok()
            .and_then(|entity| self.world.remove_one::<ItemPile>(entity).ok())
            .map(|pile| pile.items)
            .unwrap_or_default();
        let _ = self.despawn(pile_id);
        items
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Move an entity to a free cell
    pub fn move_to(&mut self, id: EntityId, to: Position) -> Result<(), RegistryError> {
        let entity = self.handle(id)?;
        match self.occupancy.get(&to) {
            Some(&occupant) if occupant != id => return Err(RegistryError::Occupied(to)),
            _ => {}
        }
        let mut pos = self
            .world
            .get::<&mut Position>(entity)
            .map_err(|_| RegistryError::UnknownEntity(id))?;
        let from = *pos;
        *pos = to;
        drop(pos);
        self.occupancy.remove(&from);
        self.occupancy.insert(to, id);
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn contains(&self, id: EntityId) -> bool {
        self.handles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whatever occupies a cell
    pub fn entity_at(&self, pos: Position) -> Option<EntityId> {
        self.occupancy.get(&pos).copied()
    }

    /// The actor standing on a cell, if any
    pub fn actor_at(&self, pos: Position) -> Option<EntityId> {
        self.entity_at(pos)
            .filter(|id| self.role(*id).is_some_and(|role| role.is_actor()))
    }

    /// The item pile on a cell, if any
    pub fn pile_at(&self, pos: Position) -> Option<EntityId> {
        self.entity_at(pos)
            .filter(|id| self.role(*id) == Some(Role::ItemPile))
    }

    /// The merchant standing on a cell, if any
    pub fn merchant_at(&self, pos: Position) -> Option<EntityId> {
        self.entity_at(pos)
            .filter(|id| self.role(*id) == Some(Role::Merchant))
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupancy.contains_key(&pos)
    }

    pub fn position(&self, id: EntityId) -> Option<Position> {
        self.component::<Position>(id)
    }

    pub fn role(&self, id: EntityId) -> Option<Role> {
        self.component::<Role>(id)
    }

    pub fn health(&self, id: EntityId) -> Option<Health> {
        self.component::<Health>(id)
    }

    pub fn stats(&self, id: EntityId) -> Option<CombatStats> {
        self.component::<CombatStats>(id)
    }

    pub fn initiative(&self, id: EntityId) -> Option<Initiative> {
        self.component::<Initiative>(id)
    }

    pub fn xp_reward(&self, id: EntityId) -> Option<XpReward> {
        self.component::<XpReward>(id)
    }

    pub fn ai_state(&self, id: EntityId) -> Option<AIState> {
        self.component::<AIState>(id)
    }

    pub fn name(&self, id: EntityId) -> Option<String> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    /// Items lying in a pile
    pub fn pile_items(&self, id: EntityId) -> Option<Vec<Item>> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&ItemPile>(entity).ok().map(|p| p.items.clone())
    }

    /// What a merchant has left for sale
    pub fn stock(&self, id: EntityId) -> Option<Vec<Offer>> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&Stock>(entity).ok().map(|s| s.offers.clone())
    }

    fn component<T: hecs::Component + Copy>(&self, id: EntityId) -> Option<T> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&T>(entity).ok().map(|c| *c)
    }

    /// Mutable access to an actor's health
    pub fn health_mut(&mut self, id: EntityId) -> Option<hecs::RefMut<'_, Health>> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&mut Health>(entity).ok()
    }

    /// Mutable access to an actor's combat stats
    pub fn stats_mut(&mut self, id: EntityId) -> Option<hecs::RefMut<'_, CombatStats>> {
        let entity = self.handle(id).ok()?;
        self.world.get::<&mut CombatStats>(entity).ok()
    }

    pub fn set_ai_state(&mut self, id: EntityId, state: AIState) {
        if let Ok(entity) = self.handle(id) {
            if let Ok(mut ai) = self.world.get::<&mut AIState>(entity) {
                *ai = state;
            }
        }
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// All live ids, ascending
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.handles.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Living monsters in acting order: fastest first, ties by ascending id
    pub fn monsters_in_turn_order(&self) -> Vec<EntityId> {
        let mut monsters: Vec<(EntityId, Initiative)> = self
            .world
            .query::<(&EntityId, &Role, &Initiative)>()
            .iter()
            .filter(|(_, (_, role, _))| role.is_monster())
            .map(|(_, (id, _, initiative))| (*id, *initiative))
            .collect();
        monsters.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        monsters.into_iter().map(|(id, _)| id).collect()
    }

    /// The (single) living boss, if any
    pub fn boss(&self) -> Option<EntityId> {
        self.world
            .query::<(&EntityId, &Role)>()
            .iter()
            .find(|(_, (_, role))| role.is_boss())
            .map(|(_, (id, _))| *id)
    }

    /// Number of living monsters
    pub fn monster_count(&self) -> usize {
        self.world
            .query::<&Role>()
            .iter()
            .filter(|(_, role)| role.is_monster())
            .count()
    }

    /// Positions straight from the component storage, independent of the
    /// occupancy index
    pub fn committed_positions(&self) -> Vec<(EntityId, Position)> {
        let mut out: Vec<_> = self
            .world
            .query::<(&EntityId, &Position)>()
            .iter()
            .map(|(_, (id, pos))| (*id, *pos))
            .collect();
        out.sort();
        out
    }

    // =========================================================================
    // Records (persistence)
    // =========================================================================

    /// Export every entity, ascending by id
    pub fn records(&self) -> Vec<EntityRecord> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.record(id))
            .collect()
    }

    pub fn record(&self, id: EntityId) -> Option<EntityRecord> {
        let position = self.position(id)?;
        let kind = match self.role(id)? {
            Role::ItemPile => RecordKind::Pile(self.pile_items(id)?),
            Role::Merchant => RecordKind::Merchant(self.stock(id)?),
            role => RecordKind::Actor(ActorSpec {
                role,
                name: self.name(id)?,
                health: self.health(id)?,
                stats: self.stats(id)?,
                initiative: self.initiative(id)?.0,
                xp_reward: self.xp_reward(id).unwrap_or_default().0,
            }),
        };
        Some(EntityRecord { id, position, kind })
    }

    /// Rebuild a registry from exported records
    pub fn from_records(records: Vec<EntityRecord>, next_id: u64) -> Result<Self, RegistryError> {
        let mut registry = Self::starting_at(next_id);
        for record in records {
            if registry.occupancy.contains_key(&record.position) {
                return Err(RegistryError::Occupied(record.position));
            }
            registry.next_id = registry.next_id.max(record.id.0 + 1);
            match record.kind {
                RecordKind::Actor(spec) => registry.insert_actor(record.id, spec, record.position),
                RecordKind::Pile(items) => registry.insert_pile(record.id, items, record.position),
                RecordKind::Merchant(offers) => {
                    registry.insert_merchant(record.id, offers, record.position)
                }
            }
        }
        Ok(registry)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
