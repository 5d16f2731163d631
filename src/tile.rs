//! Per-cell tile metadata derived from the layout matrix.
//!
//! The matrix stores small integer codes. Everything physics cares about is
//! decided once, here, when a level's tiles are derived, so nothing
//! downstream has to interpret raw codes.

use crate::assets::TextureHandle;
use crate::constants::*;
use crate::rect::Rect;

/// What a layout code means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    Void,
    /// Walkable floor with its visual variant (1-8)
    Floor(u8),
    Wall,
    WallTop,
    CrackedWall,
    Stair,
    StairUp,
    Hole,
}

impl TileKind {
    /// Classify a layout code. Unknown codes are treated as void.
    pub fn from_code(code: i32) -> Self {
        match code {
            CODE_FLOOR_MIN..=CODE_FLOOR_MAX => TileKind::Floor(code as u8),
            CODE_WALL_FRONT => TileKind::Wall,
            CODE_WALL_TOP => TileKind::WallTop,
            CODE_WALL_CRACKED => TileKind::CrackedWall,
            CODE_STAIR => TileKind::Stair,
            CODE_HOLE => TileKind::Hole,
            CODE_STAIR_UP => TileKind::StairUp,
            _ => TileKind::Void,
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            TileKind::Void | TileKind::Wall | TileKind::WallTop | TileKind::CrackedWall
        )
    }

    pub fn is_floor(&self) -> bool {
        matches!(self, TileKind::Floor(_))
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, TileKind::Wall | TileKind::WallTop | TileKind::CrackedWall)
    }

    /// Whether a walker (player pathing, enemy spawning) may stand here
    pub fn is_walkable(&self) -> bool {
        matches!(self, TileKind::Floor(_) | TileKind::Stair | TileKind::StairUp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// World-space bounds, used for both draw placement and collision
    pub rect: Rect,
    pub kind: TileKind,
    pub blocking: bool,
    pub is_breakable: bool,
    pub is_stair: bool,
    pub is_stair_up: bool,
    pub is_hole: bool,
    /// Texture resolved at derivation time
    pub texture: TextureHandle,
}

impl Tile {
    /// Derive the tile for cell (x, y) from its layout code.
    pub fn derive(code: i32, x: usize, y: usize, tile_size: f32, textures: &[TextureHandle]) -> Self {
        let kind = TileKind::from_code(code);
        let texture = usize::try_from(code)
            .ok()
            .and_then(|idx| textures.get(idx).copied())
            .unwrap_or(TextureHandle::PLACEHOLDER);

        Self {
            rect: Rect::new(x as f32 * tile_size, y as f32 * tile_size, tile_size, tile_size),
            kind,
            blocking: kind.is_blocking(),
            is_breakable: kind == TileKind::CrackedWall,
            is_stair: kind == TileKind::Stair,
            is_stair_up: kind == TileKind::StairUp,
            is_hole: kind == TileKind::Hole,
            texture,
        }
    }

    /// Void cells are never drawn
    pub fn is_visible(&self) -> bool {
        self.kind != TileKind::Void
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classification() {
        assert_eq!(TileKind::from_code(0), TileKind::Void);
        for code in 1..=8 {
            assert!(TileKind::from_code(code).is_floor());
        }
        for code in 9..=11 {
            assert!(TileKind::from_code(code).is_blocking());
        }
        assert_eq!(TileKind::from_code(12), TileKind::Stair);
        assert_eq!(TileKind::from_code(13), TileKind::Hole);
        assert_eq!(TileKind::from_code(14), TileKind::StairUp);
        assert_eq!(TileKind::from_code(99), TileKind::Void);
    }

    #[test]
    fn test_stair_and_hole_are_exclusive() {
        for code in -1..20 {
            let tile = Tile::derive(code, 0, 0, 32.0, &[]);
            let roles = [tile.is_stair, tile.is_stair_up, tile.is_hole];
            assert!(roles.iter().filter(|&&r| r).count() <= 1);
        }
    }

    #[test]
    fn test_only_cracked_wall_is_breakable() {
        let cracked = Tile::derive(CODE_WALL_CRACKED, 0, 0, 32.0, &[]);
        let wall = Tile::derive(CODE_WALL_FRONT, 0, 0, 32.0, &[]);
        assert!(cracked.is_breakable && cracked.blocking);
        assert!(!wall.is_breakable && wall.blocking);
    }

    #[test]
    fn test_rect_follows_cell() {
        let tile = Tile::derive(1, 3, 2, 16.0, &[]);
        assert_eq!(tile.rect, Rect::new(48.0, 32.0, 16.0, 16.0));
        assert!(!tile.blocking);
    }

    #[test]
    fn test_texture_resolved_from_table() {
        let textures: Vec<TextureHandle> = (0..14).map(|i| TextureHandle(100 + i)).collect();
        let tile = Tile::derive(CODE_STAIR, 0, 0, 32.0, &textures);
        assert_eq!(tile.texture, TextureHandle(112));
        let void = Tile::derive(-4, 0, 0, 32.0, &textures);
        assert_eq!(void.texture, TextureHandle::PLACEHOLDER);
    }
}
