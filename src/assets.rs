//! Opaque texture and sound handles.
//!
//! The core never looks inside a texture or a sound. It only carries handles
//! that the host renderer and audio backend resolve. `AssetCatalog` maps names
//! to handles so levels and entities can be built without touching files.

use crate::constants::*;
use crate::error::AssetError;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundHandle(pub u32);

impl TextureHandle {
    /// Drawn when a texture could not be resolved
    pub const PLACEHOLDER: TextureHandle = TextureHandle(0);
}

impl SoundHandle {
    /// Plays nothing
    pub const SILENT: SoundHandle = SoundHandle(0);
}

/// Well-known asset names
pub mod names {
    pub const PLAYER: &str = "player";
    pub const SKELETON: &str = "skeleton";
    pub const RAT: &str = "rat";
    pub const SLIME: &str = "slime";
    pub const REMOTE_PLAYER: &str = "remote_player";

    pub const PLAYER_HURT: &str = "player_hurt";
    pub const PLAYER_DEATH: &str = "player_death";
    pub const PLAYER_ATTACK: &str = "player_attack";
    pub const ENEMY_HURT: &str = "enemy_hurt";
    pub const ENEMY_DEATH: &str = "enemy_death";
    pub const WALL_BREAK: &str = "wall_break";
    pub const MENU_CHANGE: &str = "menu_change";
    pub const MENU_SELECT: &str = "menu_select";
    pub const WALK_SOUNDS: [&str; 4] = ["walk_0", "walk_1", "walk_2", "walk_3"];

    /// Texture name for a layout matrix code
    pub fn tile(code: i32) -> String {
        format!("tile_{code:02}")
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    textures: HashMap<String, TextureHandle>,
    sounds: HashMap<String, SoundHandle>,
    next_texture: u32,
    next_sound: u32,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            sounds: HashMap::new(),
            // 0 is reserved for the placeholder / silent handle
            next_texture: 1,
            next_sound: 1,
        }
    }

    /// Catalog with every name the core asks for already registered.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for code in 0..TILE_CODE_COUNT as i32 {
            catalog.register_texture(&names::tile(code));
        }
        for name in [
            names::PLAYER,
            names::SKELETON,
            names::RAT,
            names::SLIME,
            names::REMOTE_PLAYER,
        ] {
            catalog.register_texture(name);
        }
        for name in [
            names::PLAYER_HURT,
            names::PLAYER_DEATH,
            names::PLAYER_ATTACK,
            names::ENEMY_HURT,
            names::ENEMY_DEATH,
            names::WALL_BREAK,
            names::MENU_CHANGE,
            names::MENU_SELECT,
        ] {
            catalog.register_sound(name);
        }
        for name in names::WALK_SOUNDS {
            catalog.register_sound(name);
        }
        catalog
    }

    /// Register a texture name, returning the existing handle if already known
    pub fn register_texture(&mut self, name: &str) -> TextureHandle {
        if let Some(handle) = self.textures.get(name) {
            return *handle;
        }
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(name.to_string(), handle);
        handle
    }

    pub fn register_sound(&mut self, name: &str) -> SoundHandle {
        if let Some(handle) = self.sounds.get(name) {
            return *handle;
        }
        let handle = SoundHandle(self.next_sound);
        self.next_sound += 1;
        self.sounds.insert(name.to_string(), handle);
        handle
    }

    pub fn texture(&self, name: &str) -> Result<TextureHandle, AssetError> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::Missing(name.to_string()))
    }

    pub fn sound(&self, name: &str) -> Result<SoundHandle, AssetError> {
        self.sounds
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::Missing(name.to_string()))
    }

    /// Resolve a texture, reporting a miss and falling back to the placeholder
    pub fn texture_or_placeholder(&self, name: &str) -> TextureHandle {
        self.texture(name).unwrap_or_else(|e| {
            warn!("{e}; drawing placeholder");
            TextureHandle::PLACEHOLDER
        })
    }

    /// Resolve a sound, reporting a miss and falling back to silence
    pub fn sound_or_silent(&self, name: &str) -> SoundHandle {
        self.sound(name).unwrap_or_else(|e| {
            warn!("{e}; playing nothing");
            SoundHandle::SILENT
        })
    }

    /// Texture table indexed by layout matrix code
    pub fn tile_textures(&self) -> Vec<TextureHandle> {
        (0..TILE_CODE_COUNT as i32)
            .map(|code| self.texture_or_placeholder(&names::tile(code)))
            .collect()
    }

    /// Iterate registered sounds (used by audio backends to load files)
    pub fn sounds(&self) -> impl Iterator<Item = (&str, SoundHandle)> {
        self.sounds.iter().map(|(name, handle)| (name.as_str(), *handle))
    }
}
