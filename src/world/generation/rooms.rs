//! Room and corridor dungeon generator
//!
//! Classic roguelike dungeon with rectangular rooms connected by corridors.
//! Every new room is tied to its nearest placed neighbour, a flood fill
//! then patches anything left unreached, doors go into doorways, and the
//! room farthest from the entrance becomes the lair.

use rand::Rng;

use crate::config::MapConfig;
use crate::ecs::Position;
use crate::world::{LevelMap, Room, TileType};
use crate::MAX_DEPTH;

/// Lay out rooms and corridors on a fresh map. May return a map with too
/// few rooms; the caller decides whether to retry.
pub fn build_layout(rng: &mut impl Rng, depth: u32, seed: u64, config: &MapConfig) -> LevelMap {
    let width = config.width;
    let height = config.height;
    let mut map = LevelMap::new(width, height, depth, seed);

    let target = rng.gen_range(config.target_rooms.clone()) + (depth.saturating_sub(1) / 3) as usize;
    let mut rooms: Vec<Room> = Vec::new();

    for _ in 0..config.placement_attempts {
        if rooms.len() >= target {
            break;
        }

        let w = rng.gen_range(config.room_width.clone());
        let h = rng.gen_range(config.room_height.clone());
        // Keep a wall ring between the room and the map edge
        if width - w - 2 < 1 || height - h - 2 < 1 {
            continue;
        }
        let x = rng.gen_range(1..=width - w - 2);
        let y = rng.gen_range(1..=height - h - 2);

        let new_room = Room::new(x, y, w, h);

        // Check for overlaps
        if rooms.iter().any(|r| new_room.intersects(r)) {
            continue;
        }

        map.carve_room(&new_room);

        // Connect to the nearest room placed so far
        let center = new_room.center();
        if let Some(nearest) = rooms
            .iter()
            .min_by_key(|r| r.center().distance(&center))
            .map(|r| r.center())
        {
            let horizontal_first = rng.gen_bool(0.5);
            carve_corridor(&mut map, nearest, center, horizontal_first);
        }

        rooms.push(new_room);
    }

    map.rooms = rooms;
    if let Some(first) = map.rooms.first() {
        map.stairs_up = first.center();
    }
    map
}

/// Carve an L-shaped corridor between two points. Only solid rock is
/// turned into floor; existing features are left alone.
pub fn carve_corridor(map: &mut LevelMap, from: Position, to: Position, horizontal_first: bool) {
    let corner = if horizontal_first {
        Position::new(to.x, from.y)
    } else {
        Position::new(from.x, to.y)
    };
    carve_line(map, from, corner);
    carve_line(map, corner, to);
}

fn carve_line(map: &mut LevelMap, from: Position, to: Position) {
    let (x1, x2) = (from.x.min(to.x), from.x.max(to.x));
    let (y1, y2) = (from.y.min(to.y), from.y.max(to.y));
    for y in y1..=y2 {
        for x in x1..=x2 {
            let pos = Position::new(x, y);
            // Never break through the outer wall ring
            if x <= 0 || y <= 0 || x >= map.width - 1 || y >= map.height - 1 {
                continue;
            }
            if map.tile(pos) == Some(TileType::Wall) {
                map.set_tile(pos, TileType::Floor);
            }
        }
    }
}

/// Flood fill from the up stairs and carve corridors until every passable
/// tile is reachable. Returns the number of repair corridors carved.
pub fn ensure_connected(map: &mut LevelMap) -> usize {
    let mut repairs = 0;
    // Each repair joins at least one more component, so this terminates
    let budget = map.rooms.len() + map.passable_positions().len();

    while repairs < budget {
        let reached = map.reachable_from(map.stairs_up);
        let is_reached = |pos: Position| reached[map.idx(pos)];

        // Prefer whole rooms left unreached
        let unreached_room = map
            .rooms
            .iter()
            .map(|r| r.center())
            .find(|c| !is_reached(*c));

        let target = match unreached_room {
            Some(center) => center,
            None => match map.passable_positions().into_iter().find(|p| !is_reached(*p)) {
                Some(stray) => stray,
                None => break,
            },
        };

        // Nearest reached room centre, or any reached tile if none qualifies
        let anchor = map
            .rooms
            .iter()
            .map(|r| r.center())
            .filter(|c| is_reached(*c))
            .min_by_key(|c| c.distance(&target))
            .or_else(|| {
                map.passable_positions()
                    .into_iter()
                    .filter(|p| is_reached(*p))
                    .min_by_key(|p| p.distance(&target))
            });

        let Some(anchor) = anchor else {
            break;
        };

        log::warn!(
            "Depth {}: ({}, {}) unreachable, carving repair corridor from ({}, {})",
            map.depth,
            target.x,
            target.y,
            anchor.x,
            anchor.y
        );
        carve_corridor(map, anchor, target, true);
        repairs += 1;
    }

    repairs
}

/// Hang doors in room doorways: ring cells that were carved through and
/// are flanked by wall on both sides along the ring
pub fn place_doors(map: &mut LevelMap, rng: &mut impl Rng, door_chance: f64) {
    if door_chance <= 0.0 {
        return;
    }
    let rooms = map.rooms.clone();
    for room in &rooms {
        for pos in ring(room) {
            if map.tile(pos) != Some(TileType::Floor) || !is_doorway(map, room, pos) {
                continue;
            }
            if rng.gen_bool(door_chance.min(1.0)) {
                map.set_tile(pos, TileType::DoorClosed);
            }
        }
    }
}

/// The wall ring just outside a room's interior, corners excluded
fn ring(room: &Room) -> Vec<Position> {
    let mut cells = Vec::new();
    for x in room.x..room.x + room.width {
        cells.push(Position::new(x, room.y - 1));
        cells.push(Position::new(x, room.y + room.height));
    }
    for y in room.y..room.y + room.height {
        cells.push(Position::new(room.x - 1, y));
        cells.push(Position::new(room.x + room.width, y));
    }
    cells
}

fn is_doorway(map: &LevelMap, room: &Room, pos: Position) -> bool {
    let is_wall = |p: Position| map.tile(p) == Some(TileType::Wall);
    let on_horizontal_side = pos.y == room.y - 1 || pos.y == room.y + room.height;
    if on_horizontal_side {
        is_wall(Position::new(pos.x - 1, pos.y)) && is_wall(Position::new(pos.x + 1, pos.y))
    } else {
        is_wall(Position::new(pos.x, pos.y - 1)) && is_wall(Position::new(pos.x, pos.y + 1))
    }
}

/// Mark the up stairs, pick the lair (the room farthest from the entrance
/// by walking distance) and put the down stairs there unless this is the
/// bottom level
pub fn place_stairs(map: &mut LevelMap) {
    let start = map.stairs_up;
    map.set_tile(start, TileType::StairsUp);

    let distances = map.distances_from(start);
    let lair = map
        .rooms
        .iter()
        .skip(1)
        .map(|r| r.center())
        .filter_map(|c| distances[map.idx(c)].map(|d| (d, c)))
        .max_by_key(|(d, c)| (*d, std::cmp::Reverse((c.y, c.x))))
        .map(|(_, c)| c)
        .unwrap_or(start);

    map.lair = lair;
    if map.depth < MAX_DEPTH && lair != start {
        map.set_tile(lair, TileType::StairsDown);
        map.stairs_down = Some(lair);
    } else {
        map.stairs_down = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_corridor_joins_points() {
        let mut map = LevelMap::new(30, 20, 1, 0);
        let a = Position::new(3, 3);
        let b = Position::new(20, 15);
        map.set_tile(a, TileType::Floor);
        map.stairs_up = a;
        carve_corridor(&mut map, a, b, true);
        assert!(map.is_passable(Position::new(20, 3)));
        assert!(map.is_fully_connected());
    }

    #[test]
    fn test_corridor_keeps_doors() {
        let mut map = LevelMap::new(30, 10, 1, 0);
        map.set_tile(Position::new(10, 5), TileType::DoorClosed);
        carve_corridor(&mut map, Position::new(2, 5), Position::new(20, 5), true);
        assert_eq!(map.tile(Position::new(10, 5)), Some(TileType::DoorClosed));
        assert_eq!(map.tile(Position::new(11, 5)), Some(TileType::Floor));
    }

    #[test]
    fn test_repair_links_isolated_room() {
        let mut map = LevelMap::new(40, 20, 1, 0);
        map.rooms = vec![Room::new(2, 2, 5, 4), Room::new(25, 10, 6, 5)];
        for room in map.rooms.clone() {
            map.carve_room(&room);
        }
        map.stairs_up = map.rooms[0].center();
        assert!(!map.is_fully_connected());

        let repairs = ensure_connected(&mut map);
        assert_eq!(repairs, 1);
        assert!(map.is_fully_connected());
    }

    #[test]
    fn test_layout_respects_bounds() {
        let config = MapConfig::default();
        let mut rng = crate::GameRng::seed_from_u64(3);
        let map = build_layout(&mut rng, 1, 3, &config);
        for room in &map.rooms {
            assert!(room.x >= 1 && room.y >= 1);
            assert!(room.x + room.width < config.width);
            assert!(room.y + room.height < config.height);
        }
        for (i, a) in map.rooms.iter().enumerate() {
            for b in &map.rooms[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_no_stairs_down_at_bottom() {
        let mut map = LevelMap::new(40, 20, MAX_DEPTH, 0);
        map.rooms = vec![Room::new(2, 2, 5, 4), Room::new(25, 10, 6, 5)];
        for room in map.rooms.clone() {
            map.carve_room(&room);
        }
        map.stairs_up = map.rooms[0].center();
        ensure_connected(&mut map);
        place_stairs(&mut map);
        assert_eq!(map.stairs_down, None);
        assert_eq!(map.lair, map.rooms[1].center());
    }
}
