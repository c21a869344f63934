//! Map data structure
//!
//! The 2D grid representing one dungeon level.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::tile::TileType;
use crate::ecs::{Direction, Position};

/// An axis-aligned room; `x`, `y`, `width`, `height` describe the carved
/// interior, the walls sit just outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Overlaps, or sits too close to share a single wall
    pub fn intersects(&self, other: &Room) -> bool {
        !(self.x + self.width + 1 < other.x
            || other.x + other.width + 1 < self.x
            || self.y + self.height + 1 < other.y
            || other.y + other.height + 1 < self.y)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x < self.x + self.width && pos.y >= self.y && pos.y < self.y + self.height
    }

    /// Every interior cell, row by row
    pub fn cells(&self) -> Vec<Position> {
        (self.y..self.y + self.height)
            .flat_map(|y| (self.x..self.x + self.width).map(move |x| Position::new(x, y)))
            .collect()
    }
}

/// A generated dungeon level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<TileType>,
    /// Depth this level was generated for
    pub depth: u32,
    /// Seed of the run this level belongs to
    pub seed: u64,
    /// Room footprints, first room holds the up stairs
    pub rooms: Vec<Room>,
    pub stairs_up: Position,
    /// Absent on the deepest level, where the boss waits instead
    pub stairs_down: Option<Position>,
    /// Centre of the room farthest from the entrance
    pub lair: Position,
}

impl LevelMap {
    /// Create a new map filled with walls
    pub fn new(width: i32, height: i32, depth: u32, seed: u64) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![TileType::Wall; (width * height) as usize],
            depth,
            seed,
            rooms: Vec::new(),
            stairs_up: Position::new(0, 0),
            stairs_down: None,
            lair: Position::new(0, 0),
        }
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    #[inline]
    pub fn idx(&self, pos: Position) -> usize {
        self.xy_to_idx(pos.x, pos.y)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Tile storage matches the dimensions and every landmark is on the map
    pub fn is_well_formed(&self) -> bool {
        let cells = (self.width > 0 && self.height > 0)
            .then(|| self.width.checked_mul(self.height))
            .flatten();
        cells.is_some_and(|cells| self.tiles.len() == cells as usize)
            && self.in_bounds(self.stairs_up)
            && self.in_bounds(self.lair)
            && self.stairs_down.map_or(true, |pos| self.in_bounds(pos))
    }

    pub fn tile(&self, pos: Position) -> Option<TileType> {
        if self.in_bounds(pos) {
            Some(self.tiles[self.idx(pos)])
        } else {
            None
        }
    }

    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    pub fn set_tile(&mut self, pos: Position, tile: TileType) {
        if self.in_bounds(pos) {
            let idx = self.idx(pos);
            self.tiles[idx] = tile;
        }
    }

    /// Carve a room's interior to floor
    pub fn carve_room(&mut self, room: &Room) {
        for pos in room.cells() {
            self.set_tile(pos, TileType::Floor);
        }
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|t| t.is_walkable())
    }

    pub fn is_passable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|t| t.is_passable())
    }

    /// Blocks line of sight; everything off the map does
    pub fn is_opaque(&self, pos: Position) -> bool {
        self.tile(pos).map_or(true, |t| !t.is_transparent())
    }

    /// Swing a closed door open. Returns false if there is no closed door.
    pub fn open_door(&mut self, pos: Position) -> bool {
        if self.tile(pos) == Some(TileType::DoorClosed) {
            self.set_tile(pos, TileType::DoorOpen);
            true
        } else {
            false
        }
    }

    /// All passable positions (floor, doors, stairs)
    pub fn passable_positions(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_passable())
            .map(|(idx, _)| {
                let (x, y) = self.idx_to_xy(idx);
                Position::new(x, y)
            })
            .collect()
    }

    /// Index into `rooms` of the room whose interior holds `pos`
    pub fn room_containing(&self, pos: Position) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(pos))
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    /// Breadth-first step counts from `start` over passable tiles, moving
    /// cardinally. `None` marks unreachable cells.
    pub fn distances_from(&self, start: Position) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.tiles.len()];
        if !self.is_passable(start) {
            return dist;
        }
        let mut queue = VecDeque::new();
        dist[self.idx(start)] = Some(0);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            let d = dist[self.idx(pos)].unwrap_or(0);
            for dir in Direction::CARDINAL {
                let next = pos.offset(dir);
                if self.is_passable(next) && dist[self.idx(next)].is_none() {
                    dist[self.idx(next)] = Some(d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    /// Flood fill from `start`; true marks reached cells
    pub fn reachable_from(&self, start: Position) -> Vec<bool> {
        self.distances_from(start).into_iter().map(|d| d.is_some()).collect()
    }

    /// Every passable tile is reachable from the up stairs
    pub fn is_fully_connected(&self) -> bool {
        let reached = self.reachable_from(self.stairs_up);
        self.tiles
            .iter()
            .zip(reached)
            .all(|(tile, reached)| !tile.is_passable() || reached)
    }

    /// A diagonal step from `from` to `to` that squeezes past a wall
    /// corner. Melee cannot reach around one.
    pub fn cuts_corner(&self, from: Position, to: Position) -> bool {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        if dx == 0 || dy == 0 {
            return false;
        }
        !self.is_passable(Position::new(from.x + dx, from.y))
            || !self.is_passable(Position::new(from.x, from.y + dy))
    }

    /// First step of a shortest eight-way path from `from` to `to`,
    /// never squeezing past a wall corner. Closed doors count as passable.
    pub fn next_step_towards(&self, from: Position, to: Position) -> Option<Position> {
        self.next_step_avoiding(from, to, |_| false)
    }

    /// Like [`LevelMap::next_step_towards`], routing around every cell
    /// `blocked` reports (the goal itself is never blocked)
    pub fn next_step_avoiding(
        &self,
        from: Position,
        to: Position,
        blocked: impl Fn(Position) -> bool,
    ) -> Option<Position> {
        if from == to || !self.is_passable(to) || !self.in_bounds(from) {
            return None;
        }
        let mut came_from: Vec<Option<Position>> = vec![None; self.tiles.len()];
        let mut queue = VecDeque::new();
        came_from[self.idx(from)] = Some(from);
        queue.push_back(from);

        while let Some(pos) = queue.pop_front() {
            if pos == to {
                break;
            }
            for dir in Direction::ALL {
                let next = pos.offset(dir);
                let open = self.is_passable(next)
                    && !self.cuts_corner(pos, next)
                    && (next == to || !blocked(next));
                if open && came_from[self.idx(next)].is_none() {
                    came_from[self.idx(next)] = Some(pos);
                    queue.push_back(next);
                }
            }
        }

        // Walk back from the goal to the step right after `from`
        let mut step = to;
        loop {
            let prev = came_from[self.idx(step)]?;
            if prev == from {
                return Some(step);
            }
            step = prev;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rooms() -> LevelMap {
        let mut map = LevelMap::new(30, 12, 1, 7);
        map.carve_room(&Room::new(1, 1, 6, 5));
        map.carve_room(&Room::new(15, 4, 8, 5));
        map.stairs_up = Position::new(3, 3);
        map
    }

    #[test]
    fn test_rooms_need_a_gap() {
        let a = Room::new(1, 1, 5, 5);
        assert!(a.intersects(&Room::new(7, 1, 5, 5)));
        assert!(!a.intersects(&Room::new(8, 1, 5, 5)));
        assert!(a.intersects(&Room::new(3, 3, 2, 2)));
    }

    #[test]
    fn test_disconnected_rooms_detected() {
        let mut map = two_rooms();
        assert!(!map.is_fully_connected());

        for x in 6..16 {
            map.set_tile(Position::new(x, 4), TileType::Floor);
        }
        assert!(map.is_fully_connected());
    }

    #[test]
    fn test_closed_doors_keep_connectivity() {
        let mut map = two_rooms();
        for x in 6..16 {
            map.set_tile(Position::new(x, 4), TileType::Floor);
        }
        map.set_tile(Position::new(10, 4), TileType::DoorClosed);
        assert!(map.is_fully_connected());
        assert!(map.open_door(Position::new(10, 4)));
        assert!(!map.open_door(Position::new(10, 4)));
        assert_eq!(map.tile(Position::new(10, 4)), Some(TileType::DoorOpen));
    }

    #[test]
    fn test_off_map_is_opaque_wall() {
        let map = two_rooms();
        assert_eq!(map.tile(Position::new(-1, 0)), None);
        assert!(map.is_opaque(Position::new(-1, 0)));
        assert!(!map.is_walkable(Position::new(100, 100)));
    }

    #[test]
    fn test_next_step_follows_corridor() {
        let mut map = two_rooms();
        for x in 6..16 {
            map.set_tile(Position::new(x, 4), TileType::Floor);
        }
        let step = map.next_step_towards(Position::new(3, 3), Position::new(18, 6)).unwrap();
        assert!(Position::new(3, 3).is_adjacent(&step));
        assert!(map.is_walkable(step));
        assert_eq!(map.next_step_towards(Position::new(3, 3), Position::new(0, 0)), None);
    }

    #[test]
    fn test_corner_cutting() {
        let map = two_rooms();
        // (6, 5) is the room's bottom-right cell; (7, 6) lies outside
        assert!(map.cuts_corner(Position::new(6, 5), Position::new(7, 6)));
        assert!(!map.cuts_corner(Position::new(3, 3), Position::new(4, 4)));
        assert!(!map.cuts_corner(Position::new(3, 3), Position::new(4, 3)));
    }

    #[test]
    fn test_next_step_avoids_blocked_cells() {
        let mut map = LevelMap::new(12, 5, 1, 0);
        for x in 1..11 {
            map.set_tile(Position::new(x, 2), TileType::Floor);
        }
        let (from, to) = (Position::new(1, 2), Position::new(10, 2));
        assert_eq!(map.next_step_towards(from, to), Some(Position::new(2, 2)));
        // A one-wide corridor with its only way blocked
        assert_eq!(map.next_step_avoiding(from, to, |p| p == Position::new(5, 2)), None);
        assert_eq!(map.next_step_avoiding(from, Position::new(2, 2), |p| p.x == 2), Some(Position::new(2, 2)));
    }

    #[test]
    fn test_room_lookup_and_shape() {
        let mut map = two_rooms();
        map.rooms = vec![Room::new(1, 1, 6, 5), Room::new(15, 4, 8, 5)];
        assert_eq!(map.room_containing(Position::new(16, 5)), Some(1));
        assert_eq!(map.room_containing(Position::new(10, 10)), None);
        assert!(map.is_well_formed());
        map.lair = Position::new(40, 2);
        assert!(!map.is_well_formed());
    }
}
