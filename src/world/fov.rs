//! Field of View calculation
//!
//! Recursive shadowcasting for the player's view, plus a per-level memory
//! of everything ever seen. Monsters only get the cheap
//! [`has_line_of_sight`] check.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::LevelMap;
use crate::ecs::Position;

/// Compute the set of tiles visible from `origin` within `radius`
pub fn compute_visible(map: &LevelMap, origin: Position, radius: i32) -> HashSet<Position> {
    let mut visible = HashSet::new();

    // Origin is always visible
    visible.insert(origin);

    // Cast shadows in all 8 octants
    for octant in 0..8 {
        cast_light(map, &mut visible, origin, radius, 1, 1.0, 0.0, octant);
    }

    visible
}

/// Recursive shadowcasting for a single octant
#[allow(clippy::too_many_arguments)]
fn cast_light(
    map: &LevelMap,
    visible: &mut HashSet<Position>,
    origin: Position,
    radius: i32,
    row: i32,
    mut start_slope: f64,
    end_slope: f64,
    octant: u8,
) {
    if start_slope < end_slope {
        return;
    }

    let mut next_start_slope = start_slope;

    for j in row..=radius {
        let mut blocked = false;

        let dy = -j;
        for dx in dy..=0 {
            let (map_x, map_y) = transform_octant(dx, dy, octant);
            let cur = Position::new(origin.x + map_x, origin.y + map_y);

            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start_slope < right_slope {
                continue;
            }
            if end_slope > left_slope {
                break;
            }

            // Check if within circular radius
            if dx * dx + dy * dy <= radius * radius && map.in_bounds(cur) {
                visible.insert(cur);
            }

            if blocked {
                if map.is_opaque(cur) {
                    next_start_slope = right_slope;
                } else {
                    blocked = false;
                    start_slope = next_start_slope;
                }
            } else if map.is_opaque(cur) && j < radius {
                blocked = true;
                cast_light(map, visible, origin, radius, j + 1, start_slope, left_slope, octant);
                next_start_slope = right_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

/// Transform coordinates based on octant
fn transform_octant(col: i32, row: i32, octant: u8) -> (i32, i32) {
    match octant {
        0 => (col, row),
        1 => (row, col),
        2 => (row, -col),
        3 => (col, -row),
        4 => (-col, -row),
        5 => (-row, -col),
        6 => (-row, col),
        7 => (-col, row),
        _ => (col, row),
    }
}

/// Bresenham line between two cells; true when no opaque tile lies
/// strictly between them
pub fn has_line_of_sight(map: &LevelMap, from: Position, to: Position) -> bool {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);

    loop {
        if x == to.x && y == to.y {
            return true;
        }
        let pos = Position::new(x, y);
        if pos != from && map.is_opaque(pos) {
            return false;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// What the player sees now and what they remember on one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    width: i32,
    height: i32,
    visible: HashSet<Position>,
    remembered: Vec<bool>,
}

impl Visibility {
    /// Fresh memory for a level; nothing seen yet
    pub fn new(map: &LevelMap) -> Self {
        Self {
            width: map.width,
            height: map.height,
            visible: HashSet::new(),
            remembered: vec![false; (map.width * map.height) as usize],
        }
    }

    /// Recompute the view from `origin` and fold it into memory
    pub fn update(&mut self, map: &LevelMap, origin: Position, radius: i32) {
        self.visible = compute_visible(map, origin, radius);
        for pos in &self.visible {
            if let Some(idx) = self.idx(*pos) {
                self.remembered[idx] = true;
            }
        }
    }

    /// Remember the whole level (mapping scroll)
    pub fn reveal_all(&mut self) {
        self.remembered.iter_mut().for_each(|seen| *seen = true);
    }

    fn idx(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Memory covers exactly `map` and nothing visible lies off it
    pub fn fits(&self, map: &LevelMap) -> bool {
        self.width == map.width
            && self.height == map.height
            && self.remembered.len() == map.tiles().len()
            && self.visible.iter().all(|pos| map.in_bounds(*pos))
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.visible.contains(&pos)
    }

    pub fn is_remembered(&self, pos: Position) -> bool {
        self.idx(pos).is_some_and(|idx| self.remembered[idx])
    }

    pub fn visible(&self) -> &HashSet<Position> {
        &self.visible
    }

    /// Remembered cells, row-major
    pub fn remembered_positions(&self) -> Vec<Position> {
        self.remembered
            .iter()
            .enumerate()
            .filter(|(_, seen)| **seen)
            .map(|(idx, _)| {
                let idx = idx as i32;
                Position::new(idx % self.width, idx / self.width)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::map::Room;
    use crate::world::TileType;

    fn open_room() -> LevelMap {
        let mut map = LevelMap::new(21, 21, 1, 0);
        map.carve_room(&Room::new(1, 1, 19, 19));
        map
    }

    #[test]
    fn test_origin_and_neighbours_visible() {
        let map = open_room();
        let visible = compute_visible(&map, Position::new(10, 10), 6);
        assert!(visible.contains(&Position::new(10, 10)));
        assert!(visible.contains(&Position::new(11, 11)));
        assert!(visible.contains(&Position::new(10, 4)));
        assert!(!visible.contains(&Position::new(10, 3)));
    }

    #[test]
    fn test_pillar_casts_shadow() {
        let mut map = open_room();
        map.set_tile(Position::new(12, 10), TileType::Wall);
        let visible = compute_visible(&map, Position::new(10, 10), 8);
        // The pillar itself is seen, the cells right behind it are not
        assert!(visible.contains(&Position::new(12, 10)));
        assert!(!visible.contains(&Position::new(13, 10)));
        assert!(!visible.contains(&Position::new(16, 10)));
        assert!(visible.contains(&Position::new(10, 16)));
    }

    #[test]
    fn test_closed_door_blocks_view() {
        let mut map = LevelMap::new(20, 5, 1, 0);
        for x in 1..19 {
            map.set_tile(Position::new(x, 2), TileType::Floor);
        }
        map.set_tile(Position::new(6, 2), TileType::DoorClosed);
        let visible = compute_visible(&map, Position::new(2, 2), 10);
        assert!(visible.contains(&Position::new(6, 2)));
        assert!(!visible.contains(&Position::new(7, 2)));

        map.open_door(Position::new(6, 2));
        let visible = compute_visible(&map, Position::new(2, 2), 10);
        assert!(visible.contains(&Position::new(9, 2)));
    }

    #[test]
    fn test_line_of_sight() {
        let mut map = open_room();
        assert!(has_line_of_sight(&map, Position::new(2, 2), Position::new(15, 9)));
        map.set_tile(Position::new(6, 5), TileType::Wall);
        assert!(!has_line_of_sight(&map, Position::new(2, 5), Position::new(10, 5)));
        // Adjacent cells always see each other
        assert!(has_line_of_sight(&map, Position::new(5, 5), Position::new(6, 5)));
    }

    #[test]
    fn test_memory_outlives_view() {
        let map = open_room();
        let mut vis = Visibility::new(&map);
        vis.update(&map, Position::new(3, 3), 4);
        assert!(vis.is_visible(Position::new(5, 3)));

        vis.update(&map, Position::new(17, 17), 4);
        assert!(!vis.is_visible(Position::new(5, 3)));
        assert!(vis.is_remembered(Position::new(5, 3)));
        assert!(vis.is_remembered(Position::new(17, 15)));
        assert!(!vis.is_remembered(Position::new(10, 10)));
    }

    #[test]
    fn test_fits_only_its_own_map() {
        let map = open_room();
        let vis = Visibility::new(&map);
        assert!(vis.fits(&map));
        assert!(!vis.fits(&LevelMap::new(21, 20, 1, 0)));
    }
}
