//! Render snapshot
//!
//! A read-only copy of what the player is allowed to know. Cells that were
//! never seen are absent, remembered cells carry their tile but no
//! occupants, and only entities inside the current field of view are
//! listed (the player always is, alive or as remains).

use serde::{Deserialize, Serialize};

use crate::ecs::{CombatStats, EntityId, Health, Offer, Position, Role};
use crate::game::{GameState, Outcome};
use crate::items::Item;
use crate::world::TileType;

/// Messages carried in each snapshot
const SNAPSHOT_MESSAGES: usize = 8;

/// One known cell of the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub position: Position,
    pub tile: TileType,
    /// In view right now, rather than only remembered
    pub visible: bool,
}

/// An entity the player can currently see
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub name: String,
    pub glyph: char,
    pub role: Role,
    pub position: Position,
    pub health: Option<Health>,
}

/// The player's sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Position,
    pub health: Health,
    /// Including equipment bonuses
    pub stats: CombatStats,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub gold: u32,
    pub inventory: Vec<Item>,
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

/// The table of the merchant next to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopView {
    pub merchant: EntityId,
    /// Indexed as [`crate::PlayerAction::Buy`] expects
    pub offers: Vec<Offer>,
}

/// Glyph of the fallen player
const REMAINS_GLYPH: char = '%';

/// Everything a front-end needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub depth: u32,
    pub round: u64,
    pub outcome: Outcome,
    pub score: u32,
    pub width: i32,
    pub height: i32,
    /// Known cells, row-major
    pub tiles: Vec<TileView>,
    pub entities: Vec<EntityView>,
    pub player: Option<PlayerView>,
    /// Present while the player stands beside a merchant
    pub shop: Option<ShopView>,
    /// Most recent log lines, oldest first
    pub messages: Vec<String>,
}

impl RenderSnapshot {
    pub fn tile_at(&self, pos: Position) -> Option<&TileView> {
        self.tiles.iter().find(|t| t.position == pos)
    }

    pub fn entity_at(&self, pos: Position) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.position == pos)
    }

    /// Plain-text frame: unknown cells blank, entities over tiles
    pub fn render_text(&self) -> String {
        let width = self.width.max(0) as usize;
        let height = self.height.max(0) as usize;
        let mut grid = vec![vec![' '; width]; height];

        for view in &self.tiles {
            if let Some(cell) = cell_mut(&mut grid, view.position) {
                *cell = view.tile.glyph();
            }
        }
        for entity in &self.entities {
            if let Some(cell) = cell_mut(&mut grid, entity.position) {
                *cell = entity.glyph;
            }
        }

        let mut out = String::with_capacity((width + 1) * height);
        for row in grid {
            out.extend(row.into_iter());
            out.push('\n');
        }
        out
    }
}

fn cell_mut(grid: &mut [Vec<char>], pos: Position) -> Option<&mut char> {
    if pos.x < 0 || pos.y < 0 {
        return None;
    }
    grid.get_mut(pos.y as usize)?.get_mut(pos.x as usize)
}

impl GameState {
    /// Fog-of-war filtered view of the run
    pub fn snapshot(&self) -> RenderSnapshot {
        let tiles = self
            .visibility
            .remembered_positions()
            .into_iter()
            .filter_map(|position| {
                let tile = self.map.tile(position)?;
                Some(TileView {
                    position,
                    tile,
                    visible: self.visibility.is_visible(position),
                })
            })
            .collect();

        let mut entities: Vec<EntityView> = self
            .registry
            .ids()
            .into_iter()
            .filter_map(|id| self.entity_view(id))
            .filter(|view| view.id == self.player || self.visibility.is_visible(view.position))
            .collect();
        if let Some(remains) = self.remains.as_ref().filter(|_| !self.registry.contains(self.player)) {
            entities.push(EntityView {
                id: self.player,
                name: format!("your remains (slain by the {})", remains.killer),
                glyph: REMAINS_GLYPH,
                role: Role::Player,
                position: remains.position,
                health: Some(remains.health),
            });
        }
        entities.sort_by_key(|e| (e.position.y, e.position.x));

        let start = self.messages.len().saturating_sub(SNAPSHOT_MESSAGES);
        let messages = self.messages[start..].iter().map(|m| m.text.clone()).collect();

        RenderSnapshot {
            depth: self.depth,
            round: self.rounds,
            outcome: self.outcome,
            score: self.score(),
            width: self.map.width,
            height: self.map.height,
            tiles,
            entities,
            player: self.player_view(),
            shop: self.shop_view(),
            messages,
        }
    }

    fn entity_view(&self, id: EntityId) -> Option<EntityView> {
        let role = self.registry.role(id)?;
        let position = self.registry.position(id)?;
        let name = match role {
            Role::ItemPile => match self.registry.pile_items(id)?.as_slice() {
                [item] => item.name.clone(),
                items => format!("{} items", items.len()),
            },
            _ => self.registry.name(id).unwrap_or_default(),
        };
        let glyph = match role {
            Role::ItemPile => self
                .registry
                .pile_items(id)
                .and_then(|items| items.first().map(Item::glyph))
                .unwrap_or_else(|| role.glyph()),
            _ => role.glyph(),
        };
        Some(EntityView {
            id,
            name,
            glyph,
            role,
            position,
            health: self.registry.health(id),
        })
    }

    fn shop_view(&self) -> Option<ShopView> {
        let merchant = self.adjacent_merchant()?;
        Some(ShopView {
            merchant,
            offers: self.registry.stock(merchant)?,
        })
    }

    fn player_view(&self) -> Option<PlayerView> {
        Some(PlayerView {
            position: self.player_position()?,
            health: self.player_health()?,
            stats: self.effective_player_stats(),
            level: self.experience.level,
            xp: self.experience.current,
            xp_to_next: self.experience.to_next(),
            gold: self.inventory.gold(),
            inventory: self.inventory.items().to_vec(),
            weapon: self.equipment.weapon().cloned(),
            armor: self.equipment.armor().cloned(),
        })
    }
}
