//! Runtime core of a 2D tile dungeon crawler.
//!
//! Levels are generated from a seed, simulated at a fixed logical rate and
//! rendered as plain draw commands, so the whole game runs headless.

pub mod assets;
pub mod audio;
pub mod autopilot;
pub mod camera;
pub mod clock;
pub mod config;
pub mod constants;
pub mod dungeon_gen;
pub mod enemy;
pub mod entity;
pub mod error;
pub mod events;
pub mod input;
pub mod map;
pub mod menu;
pub mod network;
pub mod pathfinding;
pub mod player;
pub mod rect;
pub mod render;
pub mod session;
pub mod tile;
pub mod world;

pub use config::GameConfig;
pub use error::SessionError;
pub use session::Session;
