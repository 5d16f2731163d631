//! One dungeon level: layout matrix, derived tile data and the enemy roster.
//!
//! The tile array and the position array are always derived from the matrix
//! and always share its shape. Any matrix change goes through a method here
//! that re-derives the affected cells before the node is usable again.

use crate::assets::{AssetCatalog, TextureHandle};
use crate::camera::Camera2D;
use crate::config::{Difficulty, GameConfig};
use crate::constants::*;
use crate::dungeon_gen::{validate_matrix, DungeonGenerator};
use crate::enemy::{enemies, AiParams, Enemy};
use crate::entity::{Axis, Entity};
use crate::error::GenerationError;
use crate::events::{Actor, EventQueue, GameEvent};
use crate::player::Player;
use crate::rect::Rect;
use crate::render::{DrawCommand, DrawList, Layer};
use crate::tile::{Tile, TileKind};
use glam::Vec2;
use log::debug;

/// Everything needed to build one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    pub node_id: i32,
    pub seed: u64,
    pub size: usize,
    pub tile_size: f32,
    pub enemy_count: usize,
    pub difficulty: Difficulty,
    pub ai: AiParams,
}

impl LevelSpec {
    pub fn from_config(config: &GameConfig, node_id: i32, seed: u64) -> Self {
        Self {
            node_id,
            seed,
            size: config.map_size,
            tile_size: config.tile_size,
            enemy_count: config.scaled_enemy_count(),
            difficulty: config.difficulty,
            ai: AiParams::from_tiles(
                config.aggro_radius_tiles,
                config.melee_range_tiles,
                config.enemy_attack_cooldown,
                config.tile_size,
            ),
        }
    }
}

/// Which axes a move was stopped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    pub blocked_x: bool,
    pub blocked_y: bool,
    /// The blocked move was turned into a slide toward an open lane
    pub assisted: bool,
}

impl MoveResult {
    pub fn any(&self) -> bool {
        self.blocked_x || self.blocked_y
    }
}

/// Read-only collision view over a level's tiles
pub struct TileView<'a> {
    tiles: &'a [Vec<Tile>],
    tile_size: f32,
}

impl<'a> TileView<'a> {
    pub fn new(tiles: &'a [Vec<Tile>], tile_size: f32) -> Self {
        Self { tiles, tile_size }
    }

    fn size(&self) -> i64 {
        self.tiles.len() as i64
    }

    /// Whether `rect` overlaps a blocking tile. Anything outside the map
    /// counts as blocking.
    pub fn blocked(&self, rect: &Rect) -> bool {
        let ts = self.tile_size;
        let x0 = (rect.x / ts).floor() as i64;
        let y0 = (rect.y / ts).floor() as i64;
        let x1 = ((rect.x + rect.width) / ts).ceil() as i64 - 1;
        let y1 = ((rect.y + rect.height) / ts).ceil() as i64 - 1;
        let n = self.size();

        for x in x0..=x1 {
            for y in y0..=y1 {
                if x < 0 || y < 0 || x >= n || y >= n {
                    return true;
                }
                let tile = &self.tiles[x as usize][y as usize];
                if tile.blocking && tile.rect.intersects(rect) {
                    return true;
                }
            }
        }
        false
    }

    /// Cell containing a world point
    pub fn cell_of(&self, point: Vec2) -> Option<(usize, usize)> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let x = (point.x / self.tile_size) as usize;
        let y = (point.y / self.tile_size) as usize;
        (x < self.tiles.len() && y < self.tiles.len()).then_some((x, y))
    }

    pub fn tile_at(&self, point: Vec2) -> Option<&'a Tile> {
        self.cell_of(point).map(|(x, y)| &self.tiles[x][y])
    }

    /// Move an entity by `delta`, one axis at a time. An axis whose move
    /// lands in a blocking tile is reverted, so the entity slides along
    /// walls instead of sticking to them.
    pub fn move_entity(&self, entity: &mut Entity, delta: Vec2) -> MoveResult {
        let mut result = MoveResult::default();

        if delta.x != 0.0 {
            entity.position.x += delta.x;
            if self.blocked(&entity.hitbox()) {
                entity.revert_axis(Axis::X);
                result.blocked_x = true;
            }
        }
        if delta.y != 0.0 {
            entity.position.y += delta.y;
            if self.blocked(&entity.hitbox()) {
                entity.revert_axis(Axis::Y);
                result.blocked_y = true;
            }
        }

        // Fully stopped: slide toward the nearest grid lane if it leads on
        if result.any() && entity.position == entity.last_position {
            let (axis, step) = if delta.x.abs() >= delta.y.abs() {
                (Axis::X, delta.x)
            } else {
                (Axis::Y, delta.y)
            };
            result.assisted = self.corner_assist(entity, axis, step);
        }
        result
    }

    /// Nudge `entity` across `axis` toward the nearest tile-aligned lane when
    /// that lane is open in the direction of `step`. The nudge is no longer
    /// than the blocked step, so speed is unchanged.
    fn corner_assist(&self, entity: &mut Entity, axis: Axis, step: f32) -> bool {
        let ts = self.tile_size;
        let (along, across) = match axis {
            Axis::X => (Vec2::X, Vec2::Y),
            Axis::Y => (Vec2::Y, Vec2::X),
        };
        let current = entity.position.dot(across);
        let below = (current / ts).floor() * ts;
        let mut offsets = [below - current, below + ts - current];
        offsets.sort_by(|a, b| a.abs().total_cmp(&b.abs()));

        let size = Vec2::splat(entity.size);
        let open = |pos: Vec2| !self.blocked(&Rect::from_pos_size(pos, size));
        let lane = offsets
            .into_iter()
            .filter(|offset| *offset != 0.0 && offset.abs() <= ts * CORNER_ASSIST_TILES)
            .map(|offset| (offset, entity.position + across * offset))
            .find(|(_, lane)| open(*lane) && open(*lane + along * step));
        let Some((offset, lane)) = lane else {
            return false;
        };

        if offset.abs() <= step.abs() {
            entity.position = lane;
        } else {
            entity.position += across * offset.signum() * step.abs();
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct MapNode {
    /// Stable across regeneration; the world cache is keyed by it
    pub node_id: i32,
    seed: u64,
    tile_size: f32,
    matrix_width: usize,
    matrix_height: usize,
    /// Layout codes, `[x][y]`
    matrix: Vec<Vec<i32>>,
    tile_info: Vec<Vec<Tile>>,
    /// `positions[x][y] == (x * tile_size, y * tile_size)`
    positions: Vec<Vec<Vec2>>,
    /// Texture per layout code
    textures: Vec<TextureHandle>,
    enemies: Vec<Enemy>,
    spawn_cell: (i32, i32),
    stair_cell: (i32, i32),
    up_stair_cell: Option<(i32, i32)>,
    ai: AiParams,
    ready: bool,
}

impl MapNode {
    /// Generate and populate a level.
    pub fn generate(spec: &LevelSpec, assets: &AssetCatalog) -> Result<Self, GenerationError> {
        let mut level = DungeonGenerator::generate(spec.seed, spec.size, spec.enemy_count)?;
        // Every level below the first leads back up
        let up_stair = (spec.node_id > 0).then_some(level.entrance);
        if let Some((x, y)) = up_stair {
            level.matrix[x as usize][y as usize] = CODE_STAIR_UP;
        }
        let mut node = Self::from_matrix(
            spec.node_id,
            spec.seed,
            level.matrix,
            spec.tile_size,
            assets.tile_textures(),
            spec.ai,
        )?;
        node.spawn_cell = level.spawn;
        node.stair_cell = level.stair;

        for (def_index, (x, y)) in level.enemy_spawns {
            let def = &enemies::ALL[def_index];
            let position = node.cell_position(x, y);
            node.enemies
                .push(Enemy::spawn(def, position, spec.tile_size, assets, spec.difficulty));
        }

        debug!(
            "level {} generated: seed={} size={} enemies={} holes={}",
            node.node_id,
            spec.seed,
            spec.size,
            node.enemies.len(),
            level.holes.len()
        );
        Ok(node)
    }

    /// Build a level from an existing layout. The spawn defaults to the first
    /// walkable cell and the stair to the first stair code found.
    pub fn from_matrix(
        node_id: i32,
        seed: u64,
        matrix: Vec<Vec<i32>>,
        tile_size: f32,
        textures: Vec<TextureHandle>,
        ai: AiParams,
    ) -> Result<Self, GenerationError> {
        let size = matrix.len();
        if size < MIN_MAP_SIZE {
            return Err(GenerationError::InvalidSize {
                size: size as i64,
                min: MIN_MAP_SIZE,
            });
        }
        validate_matrix(&matrix, size, seed)?;

        let first_cell = |pred: &dyn Fn(TileKind) -> bool| {
            (0..size)
                .flat_map(|x| (0..size).map(move |y| (x, y)))
                .find(|&(x, y)| pred(TileKind::from_code(matrix[x][y])))
                .map(|(x, y)| (x as i32, y as i32))
        };
        let spawn_cell = first_cell(&|k| k.is_floor()).unwrap_or((0, 0));
        let stair_cell = first_cell(&|k| k == TileKind::Stair).unwrap_or(spawn_cell);
        let up_stair_cell = first_cell(&|k| k == TileKind::StairUp);

        let mut node = Self {
            node_id,
            seed,
            tile_size,
            matrix_width: size,
            matrix_height: size,
            matrix,
            tile_info: Vec::new(),
            positions: Vec::new(),
            textures,
            enemies: Vec::new(),
            spawn_cell,
            stair_cell,
            up_stair_cell,
            ai,
            ready: false,
        };
        node.rebuild_derived()?;
        Ok(node)
    }

    /// Re-derive tiles and positions from the whole matrix, then verify the
    /// shapes agree before marking the node ready.
    fn rebuild_derived(&mut self) -> Result<(), GenerationError> {
        self.ready = false;
        let size = self.matrix_width;
        let ts = self.tile_size;

        self.tile_info = (0..size)
            .map(|x| {
                (0..size)
                    .map(|y| Tile::derive(self.matrix[x][y], x, y, ts, &self.textures))
                    .collect()
            })
            .collect();
        self.positions = (0..size)
            .map(|x| (0..size).map(|y| Vec2::new(x as f32 * ts, y as f32 * ts)).collect())
            .collect();

        for (name, width, height) in [
            ("tile", self.tile_info.len(), self.tile_info.first().map_or(0, Vec::len)),
            ("position", self.positions.len(), self.positions.first().map_or(0, Vec::len)),
        ] {
            if width != size || height != size {
                return Err(GenerationError::ShapeMismatch {
                    array: name,
                    expected: size,
                    actual_width: width,
                    actual_height: height,
                });
            }
        }
        self.ready = true;
        Ok(())
    }

    /// True when the matrix, tile array and position array share one shape
    pub fn is_congruent(&self) -> bool {
        let (w, h) = (self.matrix_width, self.matrix_height);
        let shape_ok = |cols: usize, col_len: &dyn Fn(usize) -> usize| {
            cols == w && (0..cols).all(|x| col_len(x) == h)
        };
        shape_ok(self.matrix.len(), &|x| self.matrix[x].len())
            && shape_ok(self.tile_info.len(), &|x| self.tile_info[x].len())
            && shape_ok(self.positions.len(), &|x| self.positions[x].len())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn matrix_width(&self) -> usize {
        self.matrix_width
    }

    pub fn matrix_height(&self) -> usize {
        self.matrix_height
    }

    pub fn matrix(&self) -> &[Vec<i32>] {
        &self.matrix
    }

    pub fn code(&self, x: usize, y: usize) -> Option<i32> {
        self.matrix.get(x).and_then(|col| col.get(y)).copied()
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.tile_info.get(x).and_then(|col| col.get(y))
    }

    pub fn tiles(&self) -> &[Vec<Tile>] {
        &self.tile_info
    }

    pub fn position(&self, x: usize, y: usize) -> Option<Vec2> {
        self.positions.get(x).and_then(|col| col.get(y)).copied()
    }

    pub fn textures(&self) -> &[TextureHandle] {
        &self.textures
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.entity.is_alive()).count()
    }

    pub fn ai_params(&self) -> AiParams {
        self.ai
    }

    pub fn view(&self) -> TileView<'_> {
        TileView::new(&self.tile_info, self.tile_size)
    }

    /// World bounds of the whole level
    pub fn bounds(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.matrix_width as f32 * self.tile_size,
            self.matrix_height as f32 * self.tile_size,
        )
    }

    pub fn cell_position(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32 * self.tile_size, y as f32 * self.tile_size)
    }

    pub fn spawn_cell(&self) -> (i32, i32) {
        self.spawn_cell
    }

    pub fn spawn_position(&self) -> Vec2 {
        self.cell_position(self.spawn_cell.0, self.spawn_cell.1)
    }

    pub fn stair_cell(&self) -> (i32, i32) {
        self.stair_cell
    }

    pub fn up_stair_cell(&self) -> Option<(i32, i32)> {
        self.up_stair_cell
    }

    /// Where a player climbing back up arrives: the first floor cell beside
    /// the down stair, or the spawn when the stair is boxed in.
    pub fn return_position(&self) -> Vec2 {
        let (sx, sy) = self.stair_cell;
        [(sx, sy + 1), (sx - 1, sy), (sx + 1, sy), (sx, sy - 1)]
            .into_iter()
            .find(|&(x, y)| {
                x >= 0
                    && y >= 0
                    && self
                        .tile(x as usize, y as usize)
                        .is_some_and(|t| t.kind.is_floor())
            })
            .map_or_else(|| self.spawn_position(), |(x, y)| self.cell_position(x, y))
    }

    pub fn add_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Replace one cell's code and re-derive that cell.
    pub fn set_code(&mut self, x: usize, y: usize, code: i32) -> Result<(), GenerationError> {
        if x >= self.matrix_width || y >= self.matrix_height {
            return Err(GenerationError::OutOfBounds {
                x: x as i32,
                y: y as i32,
                size: self.matrix_width,
            });
        }
        self.ready = false;
        self.matrix[x][y] = code;
        self.tile_info[x][y] = Tile::derive(code, x, y, self.tile_size, &self.textures);
        self.positions[x][y] = Vec2::new(x as f32 * self.tile_size, y as f32 * self.tile_size);
        let cell = (x as i32, y as i32);
        if code == CODE_STAIR {
            self.stair_cell = cell;
        }
        if code == CODE_STAIR_UP {
            self.up_stair_cell = Some(cell);
        } else if self.up_stair_cell == Some(cell) {
            self.up_stair_cell = None;
        }
        self.ready = true;
        Ok(())
    }

    /// Break a cracked wall into floor. Returns false if the cell is not
    /// breakable.
    pub fn break_tile(&mut self, x: usize, y: usize, events: &mut EventQueue) -> bool {
        if !self.tile(x, y).is_some_and(|t| t.is_breakable) {
            return false;
        }
        if self.set_code(x, y, CODE_FLOOR_MIN).is_err() {
            return false;
        }
        events.push(GameEvent::TileBroken { x, y });
        true
    }

    /// Damage every live enemy overlapping `area`. Returns how many were hit.
    pub fn strike(&mut self, area: &Rect, damage: f32, events: &mut EventQueue) -> usize {
        let mut hits = 0;
        for (i, enemy) in self.enemies.iter_mut().enumerate() {
            if enemy.entity.is_alive() && enemy.entity.hitbox().intersects(area) {
                enemy.entity.take_damage(damage, Actor::Enemy(i), events);
                hits += 1;
            }
        }
        hits
    }

    /// AI and combat tick for every live enemy. Dead enemies stay in the
    /// roster, skipped, until `reap_dead` removes them.
    pub fn update_enemies(
        &mut self,
        dt: f32,
        current_frame: u32,
        player: &mut Player,
        events: &mut EventQueue,
    ) {
        puffin::profile_function!();
        let view = TileView::new(&self.tile_info, self.tile_size);
        for enemy in self.enemies.iter_mut() {
            if !enemy.entity.is_alive() {
                continue;
            }
            enemy.think(dt, &mut player.entity, &view, &self.ai, events);
            enemy.advance_animation(current_frame);
        }
    }

    /// Drop dead enemies from the roster. Returns how many were removed.
    pub fn reap_dead(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.entity.is_alive());
        before - self.enemies.len()
    }

    /// Tile draw commands for everything in view, top row first and left to
    /// right within a row, so lower tiles paint over the ones behind them.
    pub fn draw_map(&self, camera: &Camera2D) -> DrawList {
        puffin::profile_function!();
        let mut list = DrawList::new();
        let visible = camera.visible_rect();
        let source = Rect::new(0.0, 0.0, self.tile_size, self.tile_size);

        for y in 0..self.matrix_height {
            for x in 0..self.matrix_width {
                let tile = &self.tile_info[x][y];
                if !tile.is_visible() || !tile.rect.intersects(&visible) {
                    continue;
                }
                list.push(DrawCommand {
                    layer: Layer::Tiles,
                    texture: tile.texture,
                    source,
                    dest: tile.rect,
                });
            }
        }
        list
    }

    /// Enemy draw commands, back to front by feet position
    pub fn draw_enemies(&self) -> DrawList {
        puffin::profile_function!();
        let mut live: Vec<&Enemy> = self.enemies.iter().filter(|e| e.entity.is_alive()).collect();
        live.sort_by(|a, b| {
            let ay = a.entity.position.y + a.entity.size;
            let by = b.entity.position.y + b.entity.size;
            ay.total_cmp(&by).then(a.entity.position.x.total_cmp(&b.entity.position.x))
        });

        let mut list = DrawList::new();
        for enemy in live {
            list.push(DrawCommand {
                layer: Layer::Enemies,
                texture: enemy.entity.texture,
                source: enemy.entity.frame_rec,
                dest: enemy.entity.hitbox(),
            });
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::enemies;
    use crate::input::PlayerInput;
    use proptest::prelude::*;

    const TS: f32 = 32.0;

    fn ai() -> AiParams {
        AiParams::from_tiles(ENEMY_AGGRO_RADIUS_TILES, ENEMY_MELEE_RANGE_TILES, 1.0, TS)
    }

    fn spec(seed: u64, size: usize) -> LevelSpec {
        LevelSpec {
            node_id: 0,
            seed,
            size,
            tile_size: TS,
            enemy_count: 4,
            difficulty: Difficulty::Normal,
            ai: ai(),
        }
    }

    /// A walled 10x10 room with open floor inside
    fn open_room() -> MapNode {
        let n = 10;
        let matrix = (0..n)
            .map(|x| {
                (0..n)
                    .map(|y| {
                        if x == 0 || y == 0 || x == n - 1 || y == n - 1 {
                            CODE_WALL_TOP
                        } else {
                            CODE_FLOOR_MIN
                        }
                    })
                    .collect()
            })
            .collect();
        MapNode::from_matrix(1, 0, matrix, TS, AssetCatalog::with_defaults().tile_textures(), ai()).unwrap()
    }

    fn player_at(cell: (i32, i32)) -> Player {
        let assets = AssetCatalog::with_defaults();
        Player::new(Vec2::new(cell.0 as f32 * TS, cell.1 as f32 * TS), TS, PLAYER_SPEED, &assets)
    }

    fn enemy_at(cell: (i32, i32)) -> Enemy {
        let assets = AssetCatalog::with_defaults();
        Enemy::spawn(
            &enemies::SKELETON,
            Vec2::new(cell.0 as f32 * TS, cell.1 as f32 * TS),
            TS,
            &assets,
            Difficulty::Normal,
        )
    }

    #[test]
    fn test_generate_is_congruent_and_ready() {
        let node = MapNode::generate(&spec(42, 30), &AssetCatalog::with_defaults()).unwrap();
        assert!(node.is_congruent());
        assert!(node.is_ready());
        assert_eq!(node.matrix_width(), node.matrix_height());
    }

    #[test]
    fn test_positions_follow_tile_size() {
        let node = MapNode::generate(&spec(1, 12), &AssetCatalog::with_defaults()).unwrap();
        assert_eq!(node.position(3, 5), Some(Vec2::new(96.0, 160.0)));
        assert_eq!(node.tile(3, 5).unwrap().rect.min(), Vec2::new(96.0, 160.0));
    }

    #[test]
    fn test_generation_fails_closed() {
        let err = MapNode::generate(&spec(1, 0), &AssetCatalog::with_defaults()).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidSize { .. }));
    }

    #[test]
    fn test_from_matrix_rejects_ragged_layout() {
        let mut matrix = vec![vec![CODE_FLOOR_MIN; 8]; 8];
        matrix[3].pop();
        let err = MapNode::from_matrix(0, 0, matrix, TS, vec![], ai()).unwrap_err();
        assert!(matches!(err, GenerationError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_same_seed_same_level() {
        let assets = AssetCatalog::with_defaults();
        let a = MapNode::generate(&spec(42, 10), &assets).unwrap();
        let b = MapNode::generate(&spec(42, 10), &assets).unwrap();
        assert_eq!(a.matrix(), b.matrix());
        assert_eq!(a.tiles(), b.tiles());
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.enemies(), b.enemies());
    }

    #[test]
    fn test_up_stair_only_below_the_first_level() {
        let assets = AssetCatalog::with_defaults();
        let top = MapNode::generate(&spec(42, 30), &assets).unwrap();
        assert_eq!(top.up_stair_cell(), None);

        let deeper = MapNode::generate(&LevelSpec { node_id: 3, ..spec(42, 30) }, &assets).unwrap();
        let (x, y) = deeper.up_stair_cell().unwrap();
        assert_eq!(deeper.code(x as usize, y as usize), Some(CODE_STAIR_UP));
        assert!(deeper.tile(x as usize, y as usize).unwrap().is_stair_up);
        assert_ne!((x, y), deeper.spawn_cell());
        assert_ne!((x, y), deeper.stair_cell());
    }

    #[test]
    fn test_return_position_is_beside_the_down_stair() {
        let mut node = open_room();
        node.set_code(5, 5, CODE_STAIR).unwrap();
        assert_eq!(node.return_position(), node.cell_position(5, 6));

        // Below blocked: next candidate is to the left
        node.set_code(5, 6, CODE_WALL_TOP).unwrap();
        assert_eq!(node.return_position(), node.cell_position(4, 5));
    }

    #[test]
    fn test_set_code_tracks_up_stair() {
        let mut node = open_room();
        assert_eq!(node.up_stair_cell(), None);
        node.set_code(2, 2, CODE_STAIR_UP).unwrap();
        assert_eq!(node.up_stair_cell(), Some((2, 2)));
        node.set_code(2, 2, CODE_FLOOR_MIN).unwrap();
        assert_eq!(node.up_stair_cell(), None);
    }

    #[test]
    fn test_break_tile_rederives_cell() {
        let mut node = open_room();
        node.set_code(0, 4, CODE_WALL_CRACKED).unwrap();
        let mut events = EventQueue::new();

        assert!(node.break_tile(0, 4, &mut events));
        let tile = node.tile(0, 4).unwrap();
        assert!(!tile.blocking && !tile.is_breakable);
        assert_eq!(node.code(0, 4), Some(CODE_FLOOR_MIN));
        assert!(node.is_congruent());
        // Plain walls do not break
        assert!(!node.break_tile(0, 5, &mut events));
    }

    #[test]
    fn test_set_code_out_of_bounds() {
        let mut node = open_room();
        assert!(matches!(
            node.set_code(10, 0, CODE_FLOOR_MIN),
            Err(GenerationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_blocked_respects_edges() {
        let node = open_room();
        let view = node.view();
        // Flush against the left wall: touching, not overlapping
        assert!(!view.blocked(&Rect::new(TS, TS, TS, TS)));
        assert!(view.blocked(&Rect::new(TS - 0.5, TS, TS, TS)));
        // Off the map entirely
        assert!(view.blocked(&Rect::new(-100.0, TS, TS, TS)));
    }

    #[test]
    fn test_diagonal_into_corner_resolves_each_axis() {
        let node = open_room();
        let view = node.view();
        let mut player = player_at((1, 2));
        player.entity.begin_frame();
        // Up-left: x hits the wall, y is free
        let result = view.move_entity(&mut player.entity, Vec2::new(-4.0, -4.0));
        assert!(result.blocked_x && !result.blocked_y);
        assert_eq!(player.entity.position, Vec2::new(TS, 2.0 * TS - 4.0));
    }

    #[test]
    fn test_blocked_move_slides_toward_open_lane() {
        let mut node = open_room();
        for x in 1..9 {
            if x != 4 {
                node.set_code(x, 5, CODE_WALL_TOP).unwrap();
            }
        }
        let view = node.view();

        // Half a tile off the gap: the nearer lane is walled, the other is open
        let mut player = player_at((3, 4));
        player.entity.position.x += TS * 0.5;
        player.entity.begin_frame();
        let result = view.move_entity(&mut player.entity, Vec2::new(0.0, 2.0));
        assert!(result.blocked_y && result.assisted);
        assert_eq!(player.entity.position, Vec2::new(3.5 * TS + 2.0, 4.0 * TS));

        // Already lined up with a wall: no slide
        let mut player = player_at((2, 4));
        player.entity.begin_frame();
        let result = view.move_entity(&mut player.entity, Vec2::new(0.0, 2.0));
        assert!(result.blocked_y && !result.assisted);
        assert_eq!(player.entity.position, Vec2::new(2.0 * TS, 4.0 * TS));
    }

    #[test]
    fn test_enemy_cooldown_limits_damage() {
        let mut node = open_room();
        node.add_enemy(enemy_at((3, 2)));
        let mut player = player_at((2, 2));
        let mut events = EventQueue::new();
        let start = player.entity.health();

        // Half a second of continuous contact at 60 Hz
        for frame in 0..30 {
            node.update_enemies(1.0 / 60.0, frame, &mut player, &mut events);
        }
        assert_eq!(player.entity.health(), start - SKELETON_DAMAGE);

        // After the cooldown elapses it may hit again
        for frame in 30..100 {
            node.update_enemies(1.0 / 60.0, frame, &mut player, &mut events);
        }
        assert_eq!(player.entity.health(), start - 2.0 * SKELETON_DAMAGE);
    }

    #[test]
    fn test_enemy_chases_within_aggro_radius() {
        let mut node = open_room();
        node.add_enemy(enemy_at((6, 2)));
        let mut player = player_at((2, 2));
        let mut events = EventQueue::new();
        let before = node.enemies()[0].entity.position;

        node.update_enemies(0.1, 0, &mut player, &mut events);
        let after = node.enemies()[0].entity.position;
        assert!(after.x < before.x);
        assert!(node.enemies()[0].entity.is_moving);
    }

    #[test]
    fn test_enemy_ignores_player_outside_aggro() {
        let mut node = MapNode::generate(&spec(8, 40), &AssetCatalog::with_defaults()).unwrap();
        node.enemies.clear();
        let far = node.cell_position(node.spawn_cell.0, node.spawn_cell.1) + Vec2::splat(1000.0);
        node.add_enemy(Enemy::spawn(&enemies::RAT, far, TS, &AssetCatalog::with_defaults(), Difficulty::Normal));
        let mut player = player_at(node.spawn_cell());
        let mut events = EventQueue::new();

        node.update_enemies(0.1, 0, &mut player, &mut events);
        assert_eq!(node.enemies()[0].entity.position, far);
        assert!(!node.enemies()[0].entity.is_moving);
    }

    #[test]
    fn test_dead_enemies_are_skipped_until_reaped() {
        let mut node = open_room();
        node.add_enemy(enemy_at((3, 2)));
        node.add_enemy(enemy_at((6, 6)));
        let mut events = EventQueue::new();

        let hits = node.strike(&Rect::new(3.0 * TS, 2.0 * TS, TS, TS), 100.0, &mut events);
        assert_eq!(hits, 1);
        assert_eq!(node.live_enemy_count(), 1);
        assert_eq!(node.enemies().len(), 2);

        let mut player = player_at((2, 2));
        let health = player.entity.health();
        node.update_enemies(1.0 / 60.0, 1, &mut player, &mut events);
        assert_eq!(player.entity.health(), health);

        assert_eq!(node.reap_dead(), 1);
        assert_eq!(node.enemies().len(), 1);
    }

    #[test]
    fn test_draw_map_is_back_to_front_and_pure() {
        let node = open_room();
        let mut camera = Camera2D::new(10_000.0, 10_000.0);
        camera.snap_to(node.bounds().center());
        let first = node.draw_map(&camera);
        let second = node.draw_map(&camera);
        assert_eq!(first, second);
        assert_eq!(first.len(), 100);

        let ys: Vec<f32> = first.iter().map(|c| c.dest.y).collect();
        assert!(ys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_draw_map_culls_offscreen() {
        let node = open_room();
        let mut camera = Camera2D::new(64.0, 64.0);
        camera.zoom = 1.0;
        camera.snap_to(Vec2::new(TS * 1.5, TS * 1.5));
        let list = node.draw_map(&camera);
        assert!(list.len() < 100);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_draw_enemies_uses_frame_rec() {
        let mut node = open_room();
        let mut enemy = enemy_at((4, 4));
        enemy.advance_animation(ENEMY_FRAME_CADENCE);
        let frame = enemy.entity.frame_rec;
        node.add_enemy(enemy);
        let list = node.draw_enemies();
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().source, frame);
    }

    #[test]
    fn test_player_blocked_does_not_touch_enemies() {
        let mut node = open_room();
        let mut player = player_at((1, 1));
        let mut events = EventQueue::new();
        let input = PlayerInput::moving(-1.0, 0.0);
        player.update(1.0 / 60.0, 0, &mut node, &input, &mut events);
        assert!(node.is_congruent());
    }

    proptest! {
        #[test]
        fn prop_generated_nodes_are_congruent(seed in any::<u64>(), size in MIN_MAP_SIZE..40usize) {
            let node = MapNode::generate(&spec(seed, size), &AssetCatalog::with_defaults()).unwrap();
            prop_assert!(node.is_congruent());
            prop_assert_eq!(node.tiles().len(), size);
            prop_assert_eq!(node.positions.len(), size);
        }
    }
}
