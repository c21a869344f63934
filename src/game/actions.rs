//! Player actions
//!
//! Validation happens up front and never mutates anything; once an action
//! passes validation it always resolves and always costs the turn. Trading
//! with a merchant is validated the same way: a purchase the player can't
//! pay for is rejected and the round does not advance.

use crate::combat::AttackOutcome;
use crate::ecs::{Direction, EntityId, Position};
use crate::error::{ActionError, RegistryError};
use crate::game::{GameState, MessageCategory};
use crate::items::{pickup, Consumable, Item, ItemId, ItemKind, ScrollEffect};
use crate::world::TileType;

/// The one thing the player does per round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Step; stepping into a monster attacks it, into a closed door opens it
    Move(Direction),
    Attack(Direction),
    UseItem(ItemId),
    /// Buy the offer at this index from a merchant next to the player
    Buy(usize),
    Wait,
    Descend,
}

/// How the player's action resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Moved { to: Position, picked_up: Vec<Item> },
    /// Walked into a wall; the turn is spent anyway
    Bumped,
    OpenedDoor { at: Position },
    Attacked { target: EntityId, outcome: AttackOutcome },
    /// Swung at a square with nobody in it
    Whiffed,
    UsedItem { item: Item },
    /// Walked into the merchant, who shows their stock
    Browsed { merchant: EntityId },
    Bought { item: Item, price: u32 },
    Waited,
    Descended { depth: u32 },
}

impl GameState {
    /// Reject actions that cannot be attempted at all. No side effects.
    pub fn validate_action(&self, action: &PlayerAction) -> Result<(), ActionError> {
        if self.is_over() {
            return Err(ActionError::RunOver);
        }
        match action {
            PlayerAction::UseItem(id) if !self.inventory.contains(*id) => Err(ActionError::NoSuchItem(*id)),
            PlayerAction::Descend => match self.map.stairs_down {
                Some(stairs) if self.player_position() == Some(stairs) => Ok(()),
                _ => Err(ActionError::NotOnStairs),
            },
            PlayerAction::Buy(index) => self.price_of(*index).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// The merchant standing next to the player, if any
    pub fn adjacent_merchant(&self) -> Option<EntityId> {
        let pos = self.registry.position(self.player)?;
        Direction::ALL
            .into_iter()
            .find_map(|dir| self.registry.merchant_at(pos.offset(dir)))
    }

    /// Price of an offer the player could buy right now
    fn price_of(&self, index: usize) -> Result<u32, ActionError> {
        let merchant = self.adjacent_merchant().ok_or(ActionError::NoMerchant)?;
        let stock = self.registry.stock(merchant).unwrap_or_default();
        let offer = stock.get(index).ok_or(ActionError::NoSuchOffer(index))?;
        let gold = self.inventory.gold();
        if offer.price > gold {
            return Err(ActionError::CannotAfford { price: offer.price, gold });
        }
        Ok(offer.price)
    }

    /// Resolve a validated action
    pub(crate) fn perform_player_action(&mut self, action: PlayerAction) -> Result<ActionResult, ActionError> {
        match action {
            PlayerAction::Move(dir) => Ok(self.player_move(dir)?),
            PlayerAction::Attack(dir) => Ok(self.player_attack_towards(dir)?),
            PlayerAction::UseItem(id) => self.use_item(id),
            PlayerAction::Buy(index) => self.buy(index),
            PlayerAction::Wait => Ok(ActionResult::Waited),
            PlayerAction::Descend => {
                let depth = self.descend()?;
                Ok(ActionResult::Descended { depth })
            }
        }
    }

    fn player_move(&mut self, dir: Direction) -> Result<ActionResult, RegistryError> {
        let from = self.player_position().ok_or(RegistryError::UnknownEntity(self.player))?;
        let to = from.offset(dir);

        // Bump into a monster: attack it, unless a wall corner is in the way
        if let Some(target) = self.registry.actor_at(to) {
            if self.map.cuts_corner(from, to) {
                return Ok(ActionResult::Bumped);
            }
            let outcome = self.player_attack(target)?;
            return Ok(ActionResult::Attacked { target, outcome });
        }

        if let Some(merchant) = self.registry.merchant_at(to) {
            let wares = self.registry.stock(merchant).map_or(0, |stock| stock.len());
            let gold = self.inventory.gold();
            self.add_message(
                format!("The merchant shows you {} wares. (You have {} gold)", wares, gold),
                MessageCategory::Item,
            );
            return Ok(ActionResult::Browsed { merchant });
        }

        match self.map.tile(to) {
            Some(TileType::DoorClosed) => {
                self.map.open_door(to);
                self.refresh_view(from);
                self.add_message("You open the door.", MessageCategory::System);
                return Ok(ActionResult::OpenedDoor { at: to });
            }
            Some(tile) if tile.is_walkable() => {}
            _ => return Ok(ActionResult::Bumped),
        }

        // Anything on the floor is picked up before stepping in
        let picked_up = pickup(&mut self.registry, &mut self.inventory, to);
        for item in &picked_up {
            if let ItemKind::Gold { amount } = item.kind {
                self.stats.gold = self.stats.gold.saturating_add(amount);
                let total = self.inventory.gold();
                self.add_message(format!("Found {} gold! (Total: {})", amount, total), MessageCategory::Item);
            } else {
                self.add_message(format!("Picked up {}.", item.describe()), MessageCategory::Item);
            }
        }

        self.registry.move_to(self.player, to)?;
        self.refresh_view(to);
        if self.map.stairs_down == Some(to) {
            self.add_message("There is a staircase down here.", MessageCategory::System);
        }
        Ok(ActionResult::Moved { to, picked_up })
    }

    fn player_attack_towards(&mut self, dir: Direction) -> Result<ActionResult, RegistryError> {
        let from = self.player_position().ok_or(RegistryError::UnknownEntity(self.player))?;
        let at = from.offset(dir);
        let target = self
            .registry
            .actor_at(at)
            .filter(|id| self.registry.role(*id).is_some_and(|role| role.is_monster()))
            .filter(|_| !self.map.cuts_corner(from, at));

        match target {
            Some(target) => {
                let outcome = self.player_attack(target)?;
                Ok(ActionResult::Attacked { target, outcome })
            }
            None => {
                self.add_message("You swing at empty air.", MessageCategory::Combat);
                Ok(ActionResult::Whiffed)
            }
        }
    }

    fn use_item(&mut self, id: ItemId) -> Result<ActionResult, ActionError> {
        let item = self.inventory.remove_by_id(id).ok_or(ActionError::NoSuchItem(id))?;

        match item.kind {
            ItemKind::Weapon { .. } | ItemKind::Armor { .. } => {
                if let Some(previous) = self.equipment.equip(item.clone()) {
                    self.inventory.add_item(previous);
                }
                self.add_message(format!("You equip the {}.", item.describe()), MessageCategory::Item);
            }
            ItemKind::Consumable(Consumable::Potion { heal }) => {
                let (healed, now, max) = match self.registry.health_mut(self.player) {
                    Some(mut health) => (health.heal(heal), health.current, health.max),
                    None => (0, 0, 0),
                };
                self.add_message(
                    format!("You drink the potion. (+{} HP, now {}/{})", healed, now, max),
                    MessageCategory::Item,
                );
            }
            ItemKind::Consumable(Consumable::Scroll(effect)) => self.read_scroll(effect)?,
            ItemKind::Gold { amount } => {
                // Gold never sits in the pack; if it does, bank it
                self.inventory.add_gold(amount);
            }
        }

        Ok(ActionResult::UsedItem { item })
    }

    /// Pay for an offer already checked by [`GameState::validate_action`]
    fn buy(&mut self, index: usize) -> Result<ActionResult, ActionError> {
        let price = self.price_of(index)?;
        let merchant = self.adjacent_merchant().ok_or(ActionError::NoMerchant)?;
        let offer = self
            .registry
            .take_offer(merchant, index)
            .ok_or(ActionError::NoSuchOffer(index))?;
        if !self.inventory.spend_gold(price) {
            return Err(ActionError::CannotAfford { price, gold: self.inventory.gold() });
        }
        let item = offer.item;

        if self.equipment.is_upgrade(&item) {
            if let Some(previous) = self.equipment.equip(item.clone()) {
                self.inventory.add_item(previous);
            }
            self.add_message(
                format!("You buy and equip the {} for {} gold.", item.describe(), price),
                MessageCategory::Item,
            );
        } else {
            self.inventory.add_item(item.clone());
            self.add_message(
                format!("You buy the {} for {} gold.", item.describe(), price),
                MessageCategory::Item,
            );
        }
        log::debug!("Bought {} for {} gold", item.name, price);
        Ok(ActionResult::Bought { item, price })
    }

    fn read_scroll(&mut self, effect: ScrollEffect) -> Result<(), RegistryError> {
        match effect {
            ScrollEffect::Fireball | ScrollEffect::Lightning => {
                let struck = self.blast_visible_monsters()?;
                self.add_message(
                    format!("The scroll of {} blasts {} creatures!", effect.name(), struck),
                    MessageCategory::Combat,
                );
            }
            ScrollEffect::Healing => {
                if let Some(mut health) = self.registry.health_mut(self.player) {
                    health.heal_full();
                }
                self.add_message("The scroll fully restores your health!", MessageCategory::Item);
            }
            ScrollEffect::Strength => {
                if let Some(mut stats) = self.registry.stats_mut(self.player) {
                    stats.attack += 2;
                }
                let attack = self.effective_player_stats().attack;
                self.add_message(format!("You feel stronger! (ATK now {})", attack), MessageCategory::Item);
            }
            ScrollEffect::Shield => {
                if let Some(mut stats) = self.registry.stats_mut(self.player) {
                    stats.defense += 2;
                }
                let defense = self.effective_player_stats().defense;
                self.add_message(
                    format!("A magical shield surrounds you! (DEF now {})", defense),
                    MessageCategory::Item,
                );
            }
            ScrollEffect::Mapping => {
                self.visibility.reveal_all();
                self.add_message("The dungeon layout is revealed!", MessageCategory::Item);
            }
        }
        Ok(())
    }

    /// Recompute the player's field of view
    pub(crate) fn refresh_view(&mut self, origin: Position) {
        self.visibility.update(&self.map, origin, self.config.visibility.fov_radius);
    }
}

