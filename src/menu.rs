//! Title menu navigation.
//!
//! Pure state machine: keys in, a `MenuAction` out. Layout and drawing of
//! the menu belong to the frontend.

use crate::assets::{names, AssetCatalog, SoundHandle};
use crate::config::{Difficulty, GameConfig};
use crate::constants::*;
use crate::events::EventQueue;
use crate::input::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    Difficulty,
    WorldSettings,
    Multiplayer,
    /// Waiting for a peer to connect
    Hosting,
    /// Typing the address to dial
    Connecting,
}

/// What the session should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    None,
    StartOffline,
    Host,
    CancelHost,
    Connect(String),
    Quit,
}

/// How a session starts once the menu is left
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    Offline,
    /// Listen on this address
    Host(String),
    /// Dial this address
    Connect(String),
    Quit,
}

const MAIN_OPTIONS: &[&str] = &["Play", "Difficulty", "World Settings", "Multiplayer", "Quit"];
const DIFFICULTY_OPTIONS: &[&str] = &["Easy", "Normal", "Hard", "Back"];
const WORLD_OPTIONS: &[&str] = &["Seed", "Size", "Back"];
const MULTIPLAYER_OPTIONS: &[&str] = &["Host", "Connect", "Back"];
const HOSTING_OPTIONS: &[&str] = &["Cancel"];
const CONNECTING_OPTIONS: &[&str] = &["Connect", "Back"];

impl MenuScreen {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            MenuScreen::Main => MAIN_OPTIONS,
            MenuScreen::Difficulty => DIFFICULTY_OPTIONS,
            MenuScreen::WorldSettings => WORLD_OPTIONS,
            MenuScreen::Multiplayer => MULTIPLAYER_OPTIONS,
            MenuScreen::Hosting => HOSTING_OPTIONS,
            MenuScreen::Connecting => CONNECTING_OPTIONS,
        }
    }

    /// Where Escape leads
    fn parent(&self) -> MenuScreen {
        match self {
            MenuScreen::Hosting | MenuScreen::Connecting => MenuScreen::Multiplayer,
            _ => MenuScreen::Main,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuState {
    screen: MenuScreen,
    selected: usize,
    pub difficulty: Difficulty,
    pub map_seed: u64,
    pub map_size: usize,
    pub max_seed: u64,
    pub max_map_size: usize,
    address_input: String,
    change_sound: SoundHandle,
    select_sound: SoundHandle,
}

impl MenuState {
    pub fn new(config: &GameConfig, assets: &AssetCatalog) -> Self {
        Self {
            screen: MenuScreen::Main,
            selected: 0,
            difficulty: config.difficulty,
            map_seed: config.map_seed.clamp(1, MAX_MAP_SEED),
            map_size: config.map_size.clamp(MIN_MAP_SIZE, MAX_MAP_SIZE),
            max_seed: MAX_MAP_SEED,
            max_map_size: MAX_MAP_SIZE,
            address_input: String::new(),
            change_sound: assets.sound_or_silent(names::MENU_CHANGE),
            select_sound: assets.sound_or_silent(names::MENU_SELECT),
        }
    }

    pub fn screen(&self) -> MenuScreen {
        self.screen
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn address_input(&self) -> &str {
        &self.address_input
    }

    /// Copy the menu's choices onto a config
    pub fn apply_to(&self, config: &mut GameConfig) {
        config.map_seed = self.map_seed;
        config.map_size = self.map_size;
        config.difficulty = self.difficulty;
    }

    fn go_to(&mut self, screen: MenuScreen) {
        self.screen = screen;
        self.selected = 0;
    }

    /// Feed one key press.
    pub fn handle_key(&mut self, key: Key, events: &mut EventQueue) -> MenuAction {
        if self.screen == MenuScreen::Connecting {
            match key {
                Key::Char(c) => {
                    self.type_char(c);
                    return MenuAction::None;
                }
                Key::Backspace => {
                    self.address_input.pop();
                    return MenuAction::None;
                }
                _ => {}
            }
        }

        match key {
            Key::Up => {
                self.cycle(-1);
                events.play(self.change_sound);
                MenuAction::None
            }
            Key::Down => {
                self.cycle(1);
                events.play(self.change_sound);
                MenuAction::None
            }
            Key::Left | Key::Right if self.screen == MenuScreen::WorldSettings => {
                let delta = if key == Key::Left { -1 } else { 1 };
                if self.adjust_world(delta) {
                    events.play(self.change_sound);
                }
                MenuAction::None
            }
            Key::Enter => {
                events.play(self.select_sound);
                self.select()
            }
            Key::Escape => {
                let leaving_host = self.screen == MenuScreen::Hosting;
                self.go_to(self.screen.parent());
                if leaving_host {
                    MenuAction::CancelHost
                } else {
                    MenuAction::None
                }
            }
            _ => MenuAction::None,
        }
    }

    /// Feed key presses until one of them settles how to start. Running out
    /// of keys counts as quitting.
    pub fn run(&mut self, keys: impl IntoIterator<Item = Key>, events: &mut EventQueue) -> Launch {
        for key in keys {
            match self.handle_key(key, events) {
                MenuAction::None | MenuAction::CancelHost => {}
                MenuAction::StartOffline => return Launch::Offline,
                MenuAction::Host => return Launch::Host(format!("0.0.0.0:{DEFAULT_PORT}")),
                MenuAction::Connect(addr) => return Launch::Connect(addr),
                MenuAction::Quit => return Launch::Quit,
            }
        }
        Launch::Quit
    }

    /// Move the highlight, wrapping at both ends
    fn cycle(&mut self, step: i32) {
        let count = self.screen.options().len() as i32;
        self.selected = (self.selected as i32 + step).rem_euclid(count) as usize;
    }

    fn adjust_world(&mut self, delta: i64) -> bool {
        match self.selected {
            0 => {
                let next = (self.map_seed as i64 + delta).clamp(1, self.max_seed as i64) as u64;
                let changed = next != self.map_seed;
                self.map_seed = next;
                changed
            }
            1 => {
                let next = (self.map_size as i64 + delta).clamp(MIN_MAP_SIZE as i64, self.max_map_size as i64)
                    as usize;
                let changed = next != self.map_size;
                self.map_size = next;
                changed
            }
            _ => false,
        }
    }

    /// Accept digits and dots up to the address length limit
    fn type_char(&mut self, c: char) {
        if (c.is_ascii_digit() || c == '.') && self.address_input.len() < MAX_ADDRESS_CHARS {
            self.address_input.push(c);
        }
    }

    fn select(&mut self) -> MenuAction {
        match (self.screen, self.selected) {
            (MenuScreen::Main, 0) => MenuAction::StartOffline,
            (MenuScreen::Main, 1) => {
                self.go_to(MenuScreen::Difficulty);
                self.selected = self.difficulty.index() as usize;
                MenuAction::None
            }
            (MenuScreen::Main, 2) => {
                self.go_to(MenuScreen::WorldSettings);
                MenuAction::None
            }
            (MenuScreen::Main, 3) => {
                self.go_to(MenuScreen::Multiplayer);
                MenuAction::None
            }
            (MenuScreen::Main, _) => MenuAction::Quit,

            (MenuScreen::Difficulty, i) if i < Difficulty::ALL.len() => {
                self.difficulty = Difficulty::from_index(i as u8);
                self.go_to(MenuScreen::Main);
                MenuAction::None
            }
            (MenuScreen::WorldSettings, i) if i < 2 => MenuAction::None,

            (MenuScreen::Multiplayer, 0) => {
                self.go_to(MenuScreen::Hosting);
                MenuAction::Host
            }
            (MenuScreen::Multiplayer, 1) => {
                self.go_to(MenuScreen::Connecting);
                MenuAction::None
            }

            (MenuScreen::Hosting, _) => {
                self.go_to(MenuScreen::Multiplayer);
                MenuAction::CancelHost
            }

            (MenuScreen::Connecting, 0) => {
                if self.address_input.is_empty() {
                    MenuAction::None
                } else {
                    MenuAction::Connect(self.address_input.clone())
                }
            }

            (screen, _) => {
                self.go_to(screen.parent());
                MenuAction::None
            }
        }
    }
}
