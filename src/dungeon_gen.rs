//! Seeded BSP dungeon generator.
//!
//! Produces the integer layout matrix for one level plus the points the level
//! needs to populate itself (player spawn, stair, enemy spawns). The same
//! (seed, size, enemy count) always yields the same level.

use crate::constants::*;
use crate::enemy::enemies;
use crate::error::GenerationError;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A rectangle of cells representing a room or region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if a cell is inside this room
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// One cell of the space partition. Children always sit at higher indices
/// than their parent, so walking the arena backwards visits every subtree
/// before the node that joins it.
struct Partition {
    region: Room,
    children: Option<(usize, usize)>,
    room: Option<Room>,
}

impl Partition {
    fn leaf(region: Room) -> Self {
        Self {
            region,
            children: None,
            room: None,
        }
    }
}

/// Binary space partition of the map, stored as a flat arena
struct Bsp {
    parts: Vec<Partition>,
}

impl Bsp {
    /// Partition `bounds` until every leaf is too small to cut again.
    fn build(bounds: Room, rng: &mut impl Rng) -> Self {
        let mut parts = vec![Partition::leaf(bounds)];
        let mut pending = vec![0];
        while let Some(index) = pending.pop() {
            let Some((first, second)) = cut(parts[index].region, rng) else {
                continue;
            };
            let a = parts.len();
            parts.push(Partition::leaf(first));
            parts.push(Partition::leaf(second));
            parts[index].children = Some((a, a + 1));
            // First child on top so it is cut before its sibling
            pending.extend([a + 1, a]);
        }
        Self { parts }
    }

    /// Leaf indices under `index`, first child first
    fn leaves_under(&self, index: usize) -> Vec<usize> {
        let mut leaves = Vec::new();
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            match self.parts[i].children {
                Some((a, b)) => stack.extend([b, a]),
                None => leaves.push(i),
            }
        }
        leaves
    }

    fn furnish(&mut self, rng: &mut impl Rng) {
        for leaf in self.leaves_under(0) {
            self.parts[leaf].room = fit_room(self.parts[leaf].region, rng);
        }
    }

    /// The room a corridor into this subtree should aim for
    fn anchor_room(&self, index: usize) -> Option<Room> {
        self.leaves_under(index).into_iter().find_map(|i| self.parts[i].room)
    }

    fn rooms(&self) -> Vec<Room> {
        self.leaves_under(0)
            .into_iter()
            .filter_map(|i| self.parts[i].room)
            .collect()
    }

    /// Sibling subtrees to join, deepest first
    fn joints(&self) -> Vec<(Room, Room)> {
        self.parts
            .iter()
            .rev()
            .filter_map(|part| part.children)
            .filter_map(|(a, b)| Some((self.anchor_room(a)?, self.anchor_room(b)?)))
            .collect()
    }
}

/// Cut a region in two along its longer side, or return `None` when neither
/// half would reach the minimum leaf size.
fn cut(region: Room, rng: &mut impl Rng) -> Option<(Room, Room)> {
    let min = DUNGEON_MIN_LEAF_SIZE;
    let across_rows = match (region.height >= min * 2, region.width >= min * 2) {
        (false, false) => return None,
        (true, false) => true,
        (false, true) => false,
        (true, true) if region.width > region.height * 2 => false,
        (true, true) if region.height > region.width * 2 => true,
        (true, true) => rng.gen_bool(0.5),
    };

    let Room { x, y, width, height } = region;
    if across_rows {
        let at = rng.gen_range(min..=height - min);
        Some((Room::new(x, y, width, at), Room::new(x, y + at, width, height - at)))
    } else {
        let at = rng.gen_range(min..=width - min);
        Some((Room::new(x, y, at, height), Room::new(x + at, y, width - at, height)))
    }
}

/// A random room inside `region`, kept off its edges by the room margin
fn fit_room(region: Room, rng: &mut impl Rng) -> Option<Room> {
    let inner_w = region.width - DUNGEON_ROOM_MARGIN * 2;
    let inner_h = region.height - DUNGEON_ROOM_MARGIN * 2;
    if inner_w < DUNGEON_MIN_ROOM_SIZE || inner_h < DUNGEON_MIN_ROOM_SIZE {
        return None;
    }
    let width = rng.gen_range(DUNGEON_MIN_ROOM_SIZE..=inner_w);
    let height = rng.gen_range(DUNGEON_MIN_ROOM_SIZE..=inner_h);
    Some(Room::new(
        region.x + DUNGEON_ROOM_MARGIN + rng.gen_range(0..=inner_w - width),
        region.y + DUNGEON_ROOM_MARGIN + rng.gen_range(0..=inner_h - height),
        width,
        height,
    ))
}

/// Result of generating one level
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLevel {
    /// Layout codes indexed `[x][y]`
    pub matrix: Vec<Vec<i32>>,
    pub rooms: Vec<Room>,
    /// Cell the player enters on
    pub spawn: (i32, i32),
    /// Floor cell in the first room reserved for a stair back up
    pub entrance: (i32, i32),
    pub stair: (i32, i32),
    pub holes: Vec<(i32, i32)>,
    /// (index into `enemies::ALL`, cell)
    pub enemy_spawns: Vec<(usize, (i32, i32))>,
}

pub struct DungeonGenerator {
    size: usize,
    matrix: Vec<Vec<i32>>,
}

impl DungeonGenerator {
    fn new(size: usize) -> Self {
        Self {
            size,
            matrix: vec![vec![CODE_VOID; size]; size],
        }
    }

    /// Generate a level. Fails closed: either a fully-shaped level or an error.
    pub fn generate(seed: u64, size: usize, enemy_count: usize) -> Result<GeneratedLevel, GenerationError> {
        if size < MIN_MAP_SIZE {
            return Err(GenerationError::InvalidSize {
                size: size as i64,
                min: MIN_MAP_SIZE,
            });
        }

        let mut gen = Self::new(size);
        let mut rng = StdRng::seed_from_u64(seed);

        // Keep a void ring around the map so walls always have a neighbour
        let n = size as i32;
        let mut bsp = Bsp::build(Room::new(1, 1, n - 2, n - 2), &mut rng);
        bsp.furnish(&mut rng);

        let rooms = bsp.rooms();
        if rooms.is_empty() {
            return Err(GenerationError::NoFloor { seed });
        }

        for room in &rooms {
            gen.carve_room(room);
        }
        for (from, to) in bsp.joints() {
            gen.carve_corridor(from.center(), to.center(), &mut rng);
        }

        // First room is the entrance; the stair goes as far away as the layout allows
        let spawn = rooms[0].center();
        let entrance = (rooms[0].x, rooms[0].y);
        let stair = if rooms.len() >= 2 {
            rooms[rooms.len() - 1].center()
        } else {
            let room = &rooms[0];
            (room.x + room.width - 1, room.y + room.height - 1)
        };
        gen.set(stair.0, stair.1, CODE_STAIR);

        let holes = gen.place_holes(&rooms, spawn, stair, &mut rng);
        gen.paint_floor_variants(seed);
        gen.raise_walls(&mut rng);

        let enemy_spawns = gen.pick_enemy_spawns(&rooms, spawn, entrance, enemy_count, &mut rng);

        let level = GeneratedLevel {
            matrix: gen.matrix,
            rooms,
            spawn,
            entrance,
            stair,
            holes,
            enemy_spawns,
        };
        validate_matrix(&level.matrix, size, seed)?;
        Ok(level)
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    fn get(&self, x: i32, y: i32) -> Option<i32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.matrix[x as usize][y as usize])
    }

    fn set(&mut self, x: i32, y: i32, code: i32) {
        if self.in_bounds(x, y) {
            self.matrix[x as usize][y as usize] = code;
        }
    }

    fn is_open(code: i32) -> bool {
        matches!(
            code,
            CODE_FLOOR_MIN..=CODE_FLOOR_MAX | CODE_STAIR | CODE_STAIR_UP | CODE_HOLE
        )
    }

    fn carve_room(&mut self, room: &Room) {
        for x in room.x..room.x + room.width {
            for y in room.y..room.y + room.height {
                self.set(x, y, CODE_FLOOR_MIN);
            }
        }
    }

    /// Join two cells with one elbow. Which way the elbow bends is random.
    fn carve_corridor(&mut self, from: (i32, i32), to: (i32, i32), rng: &mut impl Rng) {
        let elbow = if rng.gen_bool(0.5) {
            (to.0, from.1)
        } else {
            (from.0, to.1)
        };
        self.carve_straight(from, elbow);
        self.carve_straight(elbow, to);
    }

    /// Floor every cell of the box spanned by `a` and `b`; for cells sharing
    /// a row or column that is a straight run.
    fn carve_straight(&mut self, a: (i32, i32), b: (i32, i32)) {
        for x in a.0.min(b.0)..=a.0.max(b.0) {
            for y in a.1.min(b.1)..=a.1.max(b.1) {
                self.set(x, y, CODE_FLOOR_MIN);
            }
        }
    }

    /// Put at most one hole in each middle room, on an interior cell so the
    /// room stays passable around it.
    fn place_holes(
        &mut self,
        rooms: &[Room],
        spawn: (i32, i32),
        stair: (i32, i32),
        rng: &mut impl Rng,
    ) -> Vec<(i32, i32)> {
        let mut holes = Vec::new();
        if rooms.len() < 3 {
            return holes;
        }
        for room in &rooms[1..rooms.len() - 1] {
            if !rng.gen_bool(HOLE_ROOM_CHANCE) {
                continue;
            }
            let candidates: Vec<(i32, i32)> = (room.x + 1..room.x + room.width - 1)
                .flat_map(|x| (room.y + 1..room.y + room.height - 1).map(move |y| (x, y)))
                .filter(|&cell| cell != room.center() && cell != spawn && cell != stair)
                .collect();
            if let Some(&(x, y)) = candidates.choose(rng) {
                self.set(x, y, CODE_HOLE);
                holes.push((x, y));
            }
        }
        holes
    }

    /// Pick a floor variant per cell from smooth noise so variants form patches
    fn paint_floor_variants(&mut self, seed: u64) {
        let perlin = Perlin::new(seed as u32);
        let variants = (CODE_FLOOR_MAX - CODE_FLOOR_MIN + 1) as f64;
        for x in 0..self.size {
            for y in 0..self.size {
                if self.matrix[x][y] != CODE_FLOOR_MIN {
                    continue;
                }
                let v = perlin.get([x as f64 * FLOOR_NOISE_SCALE, y as f64 * FLOOR_NOISE_SCALE]);
                let t = ((v + 1.0) * 0.5).clamp(0.0, 0.999_999);
                self.matrix[x][y] = CODE_FLOOR_MIN + (t * variants) as i32;
            }
        }
    }

    /// Wrap every open cell in walls. Walls with open ground directly below
    /// show their front face; the rest show their top. Some interior walls
    /// come out cracked.
    fn raise_walls(&mut self, rng: &mut impl Rng) {
        let n = self.size as i32;
        let mut walls = Vec::new();
        for x in 0..n {
            for y in 0..n {
                if self.get(x, y) != Some(CODE_VOID) {
                    continue;
                }
                let touches_open = (-1..=1)
                    .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
                    .any(|(dx, dy)| self.get(x + dx, y + dy).is_some_and(Self::is_open));
                if !touches_open {
                    continue;
                }
                let front = self.get(x, y + 1).is_some_and(Self::is_open);
                let on_edge = x == 0 || y == 0 || x == n - 1 || y == n - 1;
                let code = if !on_edge && rng.gen_bool(BREAKABLE_WALL_CHANCE) {
                    CODE_WALL_CRACKED
                } else if front {
                    CODE_WALL_FRONT
                } else {
                    CODE_WALL_TOP
                };
                walls.push((x, y, code));
            }
        }
        for (x, y, code) in walls {
            self.set(x, y, code);
        }
    }

    fn pick_enemy_spawns(
        &self,
        rooms: &[Room],
        spawn: (i32, i32),
        entrance: (i32, i32),
        count: usize,
        rng: &mut impl Rng,
    ) -> Vec<(usize, (i32, i32))> {
        let skip_first = rooms.len() > 1;
        let mut candidates: Vec<(i32, i32)> = rooms
            .iter()
            .enumerate()
            .filter(|(i, _)| !(skip_first && *i == 0))
            .flat_map(|(_, room)| {
                (room.x..room.x + room.width)
                    .flat_map(move |x| (room.y..room.y + room.height).map(move |y| (x, y)))
            })
            .filter(|&(x, y)| {
                self.get(x, y).is_some_and(|c| (CODE_FLOOR_MIN..=CODE_FLOOR_MAX).contains(&c))
                    && (x, y) != entrance
                    && (x - spawn.0).abs() + (y - spawn.1).abs() >= ENEMY_SPAWN_SAFE_DISTANCE
            })
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        candidates.shuffle(rng);

        candidates
            .into_iter()
            .take(count)
            .map(|cell| (rng.gen_range(0..enemies::ALL.len()), cell))
            .collect()
    }
}

/// Check a layout is `size` x `size` and has somewhere to stand.
pub fn validate_matrix(matrix: &[Vec<i32>], size: usize, seed: u64) -> Result<(), GenerationError> {
    if matrix.len() != size || matrix.iter().any(|col| col.len() != size) {
        return Err(GenerationError::ShapeMismatch {
            array: "layout",
            expected: size,
            actual_width: matrix.len(),
            actual_height: matrix.first().map_or(0, Vec::len),
        });
    }
    let has_floor = matrix
        .iter()
        .flatten()
        .any(|&c| (CODE_FLOOR_MIN..=CODE_FLOOR_MAX).contains(&c));
    if !has_floor {
        return Err(GenerationError::NoFloor { seed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn code_at(level: &GeneratedLevel, cell: (i32, i32)) -> i32 {
        level.matrix[cell.0 as usize][cell.1 as usize]
    }

    #[test]
    fn test_room_center() {
        assert_eq!(Room::new(0, 0, 10, 10).center(), (5, 5));
        assert_eq!(Room::new(5, 5, 4, 6).center(), (7, 8));
    }

    #[test]
    fn test_rejects_small_sizes() {
        for size in [0, 1, MIN_MAP_SIZE - 1] {
            assert!(matches!(
                DungeonGenerator::generate(1, size, 0),
                Err(GenerationError::InvalidSize { .. })
            ));
        }
    }

    #[test]
    fn test_generates_square_matrix() {
        let level = DungeonGenerator::generate(42, 50, 4).unwrap();
        assert_eq!(level.matrix.len(), 50);
        assert!(level.matrix.iter().all(|col| col.len() == 50));
    }

    #[test]
    fn test_small_map_still_has_stair_and_spawn() {
        let level = DungeonGenerator::generate(42, 10, 2).unwrap();
        assert_eq!(code_at(&level, level.stair), CODE_STAIR);
        assert_ne!(level.spawn, level.stair);
        let spawn_code = code_at(&level, level.spawn);
        assert!((CODE_FLOOR_MIN..=CODE_FLOOR_MAX).contains(&spawn_code));
    }

    #[test]
    fn test_border_is_never_floor() {
        let level = DungeonGenerator::generate(9, 40, 0).unwrap();
        let n = 40;
        for i in 0..n {
            for (x, y) in [(0, i), (n - 1, i), (i, 0), (i, n - 1)] {
                let code = level.matrix[x][y];
                assert!(code == CODE_VOID || (CODE_WALL_FRONT..=CODE_WALL_TOP).contains(&code));
            }
        }
    }

    #[test]
    fn test_open_cells_are_enclosed_by_walls() {
        let level = DungeonGenerator::generate(3, 40, 0).unwrap();
        for x in 1..39usize {
            for y in 1..39usize {
                if !DungeonGenerator::is_open(level.matrix[x][y]) {
                    continue;
                }
                for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                    assert_ne!(level.matrix[nx][ny], CODE_VOID, "open cell ({x},{y}) leaks into void");
                }
            }
        }
    }

    #[test]
    fn test_enemy_spawns_are_on_floor_away_from_spawn() {
        let level = DungeonGenerator::generate(11, 60, 8).unwrap();
        assert!(!level.enemy_spawns.is_empty());
        for (def, cell) in &level.enemy_spawns {
            assert!(*def < enemies::ALL.len());
            let code = code_at(&level, *cell);
            assert!((CODE_FLOOR_MIN..=CODE_FLOOR_MAX).contains(&code));
            let dist = (cell.0 - level.spawn.0).abs() + (cell.1 - level.spawn.1).abs();
            assert!(dist >= ENEMY_SPAWN_SAFE_DISTANCE);
        }
    }

    #[test]
    fn test_holes_are_recorded_in_matrix() {
        let level = DungeonGenerator::generate(5, 80, 0).unwrap();
        for hole in &level.holes {
            assert_eq!(code_at(&level, *hole), CODE_HOLE);
        }
    }

    #[test]
    fn test_small_region_is_not_cut() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(cut(Room::new(0, 0, 5, 5), &mut rng).is_none());
        let bsp = Bsp::build(Room::new(0, 0, 5, 5), &mut rng);
        assert_eq!(bsp.parts.len(), 1);
    }

    #[test]
    fn test_partition_leaves_tile_the_region() {
        let mut rng = StdRng::seed_from_u64(0);
        let bounds = Room::new(0, 0, 100, 60);
        let bsp = Bsp::build(bounds, &mut rng);
        let leaves = bsp.leaves_under(0);
        assert!(leaves.len() > 1);

        let area: i32 = leaves.iter().map(|&i| bsp.parts[i].region.width * bsp.parts[i].region.height).sum();
        assert_eq!(area, bounds.width * bounds.height);
        for &i in &leaves {
            let r = bsp.parts[i].region;
            assert!(r.width >= DUNGEON_MIN_LEAF_SIZE && r.height >= DUNGEON_MIN_LEAF_SIZE);
        }
        // One joint per cut
        assert_eq!(bsp.parts.iter().filter(|p| p.children.is_some()).count(), leaves.len() - 1);
    }

    #[test]
    fn test_wide_region_is_cut_across_columns() {
        let mut rng = StdRng::seed_from_u64(4);
        let (a, b) = cut(Room::new(0, 0, 60, 20), &mut rng).unwrap();
        assert_eq!((a.height, b.height), (20, 20));
        assert_eq!(a.width + b.width, 60);
    }

    #[test]
    fn test_elbow_corridor_connects_endpoints() {
        let mut gen = DungeonGenerator::new(20);
        let mut rng = StdRng::seed_from_u64(1);
        gen.carve_corridor((2, 3), (15, 12), &mut rng);
        assert_eq!(gen.get(2, 3), Some(CODE_FLOOR_MIN));
        assert_eq!(gen.get(15, 12), Some(CODE_FLOOR_MIN));
        let carved = gen.matrix.iter().flatten().filter(|&&c| c == CODE_FLOOR_MIN).count();
        // Two legs sharing the elbow cell
        assert_eq!(carved, (15 - 2 + 1) + (12 - 3 + 1) - 1);
    }

    #[test]
    fn test_entrance_is_plain_floor_free_of_enemies() {
        for seed in 0..20 {
            let level = DungeonGenerator::generate(seed, 30, 10).unwrap();
            let code = code_at(&level, level.entrance);
            assert!((CODE_FLOOR_MIN..=CODE_FLOOR_MAX).contains(&code));
            assert_ne!(level.entrance, level.spawn);
            assert_ne!(level.entrance, level.stair);
            assert!(level.enemy_spawns.iter().all(|(_, cell)| *cell != level.entrance));
        }
    }

    proptest! {
        #[test]
        fn prop_generation_is_deterministic(seed in any::<u64>(), size in MIN_MAP_SIZE..48usize) {
            let a = DungeonGenerator::generate(seed, size, 5).unwrap();
            let b = DungeonGenerator::generate(seed, size, 5).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
