//! Game constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Anything a player might want to tweak lives in `GameConfig` instead;
//! these are the defaults it falls back to.

mod animation;
mod camera;
mod combat;
mod dungeon;
mod enemies;
mod gameplay;
mod network;
mod time;

pub use animation::*;
pub use camera::*;
pub use combat::*;
pub use dungeon::*;
pub use enemies::*;
pub use gameplay::*;
pub use network::*;
pub use time::*;
