//! Multi-level dungeon: which level is active and which have been visited.
//!
//! Levels are keyed by `node_id`. Leaving a level keeps it in the cache as
//! it was left (dead enemies reaped, broken walls still broken). Entering an
//! unvisited level generates it from a seed derived from the base seed and
//! the node id, so a given base seed always produces the same dungeon.
//!
//! The cache holds at most `LEVEL_CACHE_CAPACITY` levels. When it overflows
//! the level farthest from the active one is dropped; going back there later
//! regenerates it fresh from its seed.

use crate::assets::AssetCatalog;
use crate::config::GameConfig;
use crate::constants::LEVEL_CACHE_CAPACITY;
use crate::error::GenerationError;
use crate::events::{EventQueue, GameEvent, TransitionCause};
use crate::map::{LevelSpec, MapNode};
use log::{debug, info};
use std::collections::HashMap;

/// Seed for one level. Node 0 uses the base seed unchanged.
pub fn node_seed(base_seed: u64, node_id: i32) -> u64 {
    base_seed ^ (node_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[derive(Debug)]
pub struct WorldGraph {
    base_seed: u64,
    config: GameConfig,
    active: MapNode,
    visited: HashMap<i32, MapNode>,
    /// Depth counter shown to the player; 1 on the first level
    map_level: u32,
}

impl WorldGraph {
    /// Generate the first level.
    pub fn new(config: GameConfig, assets: &AssetCatalog) -> Result<Self, GenerationError> {
        let base_seed = config.map_seed;
        let active = MapNode::generate(&LevelSpec::from_config(&config, 0, node_seed(base_seed, 0)), assets)?;
        info!("world created: seed={} size={}", base_seed, config.map_size);
        Ok(Self {
            base_seed,
            config,
            active,
            visited: HashMap::new(),
            map_level: 1,
        })
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn active(&self) -> &MapNode {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut MapNode {
        &mut self.active
    }

    pub fn map_level(&self) -> u32 {
        self.map_level
    }

    pub fn is_visited(&self, node_id: i32) -> bool {
        self.visited.contains_key(&node_id)
    }

    pub fn cached_levels(&self) -> usize {
        self.visited.len()
    }

    /// Leave the active level for `node_id + 1`. Stairs and holes both lead
    /// down one level. On failure the active level is unchanged.
    pub fn descend(
        &mut self,
        cause: TransitionCause,
        assets: &AssetCatalog,
        events: &mut EventQueue,
    ) -> Result<&MapNode, GenerationError> {
        let from = self.active.node_id;
        let to = from + 1;
        self.travel(to, assets)?;
        self.map_level += 1;
        events.push(GameEvent::LevelChanged { from, to, cause });
        info!("level {from} -> {to} ({cause:?}), depth {}", self.map_level);
        Ok(&self.active)
    }

    /// Climb back to `node_id - 1`. Returns `None` on the first level, which
    /// has no way up. On failure the active level is unchanged.
    pub fn ascend(
        &mut self,
        assets: &AssetCatalog,
        events: &mut EventQueue,
    ) -> Result<Option<&MapNode>, GenerationError> {
        let from = self.active.node_id;
        if from <= 0 {
            return Ok(None);
        }
        let to = from - 1;
        self.travel(to, assets)?;
        self.map_level = self.map_level.saturating_sub(1).max(1);
        events.push(GameEvent::LevelChanged {
            from,
            to,
            cause: TransitionCause::StairUp,
        });
        info!("level {from} -> {to} (StairUp), depth {}", self.map_level);
        Ok(Some(&self.active))
    }

    /// Make `node_id` the active level, caching the one being left.
    fn travel(&mut self, node_id: i32, assets: &AssetCatalog) -> Result<(), GenerationError> {
        let next = match self.visited.remove(&node_id) {
            Some(node) => {
                debug!("level {node_id} restored from cache");
                node
            }
            None => {
                let seed = node_seed(self.base_seed, node_id);
                MapNode::generate(&LevelSpec::from_config(&self.config, node_id, seed), assets)?
            }
        };
        let mut previous = std::mem::replace(&mut self.active, next);
        previous.reap_dead();
        self.visited.insert(previous.node_id, previous);
        self.evict_distant();
        Ok(())
    }

    fn evict_distant(&mut self) {
        while self.visited.len() > LEVEL_CACHE_CAPACITY {
            let active = self.active.node_id;
            let Some(&far) = self.visited.keys().max_by_key(|id| ((*id - active).abs(), **id)) else {
                return;
            };
            self.visited.remove(&far);
            debug!("level {far} dropped from cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            map_seed: 7,
            map_size: 20,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_node_seed_is_stable_and_distinct() {
        assert_eq!(node_seed(42, 0), 42);
        assert_eq!(node_seed(42, 3), node_seed(42, 3));
        assert_ne!(node_seed(42, 1), node_seed(42, 2));
    }

    #[test]
    fn test_descend_advances_node_and_depth() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();

        world.descend(TransitionCause::Stair, &assets, &mut events).unwrap();
        assert_eq!(world.active().node_id, 1);
        assert_eq!(world.map_level(), 2);
        assert!(world.is_visited(0));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::LevelChanged { from: 0, to: 1, cause: TransitionCause::Stair }
        )));
    }

    #[test]
    fn test_revisit_returns_cached_level() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();

        world.active_mut().set_code(0, 0, crate::constants::CODE_WALL_CRACKED).unwrap();
        let marked = world.active().matrix().to_vec();
        world.descend(TransitionCause::Hole, &assets, &mut events).unwrap();
        world.ascend(&assets, &mut events).unwrap().unwrap();
        assert_eq!(world.active().node_id, 0);
        assert_eq!(world.active().matrix(), marked.as_slice());
        assert_eq!(world.map_level(), 1);
        assert!(world.is_visited(1));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::LevelChanged { from: 1, to: 0, cause: TransitionCause::StairUp }
        )));
    }

    #[test]
    fn test_first_level_has_no_way_up() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();
        assert!(world.ascend(&assets, &mut events).unwrap().is_none());
        assert_eq!(world.active().node_id, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_cache_keeps_nearest_levels() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();
        let depth = LEVEL_CACHE_CAPACITY as i32 + 3;
        for _ in 0..depth {
            world.descend(TransitionCause::Stair, &assets, &mut events).unwrap();
        }
        assert_eq!(world.cached_levels(), LEVEL_CACHE_CAPACITY);
        assert!(!world.is_visited(0));
        assert!(world.is_visited(depth - 1));

        // Walking back up reads from the cache
        world.ascend(&assets, &mut events).unwrap().unwrap();
        assert_eq!(world.active().node_id, depth - 1);
        assert!(world.is_visited(depth));
        assert!(world.cached_levels() <= LEVEL_CACHE_CAPACITY);
    }

    #[test]
    fn test_evicted_level_regenerates_from_seed() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();
        let pristine = world.active().matrix().to_vec();
        world.active_mut().set_code(0, 0, crate::constants::CODE_WALL_CRACKED).unwrap();

        for _ in 0..=LEVEL_CACHE_CAPACITY {
            world.descend(TransitionCause::Stair, &assets, &mut events).unwrap();
        }
        assert!(!world.is_visited(0));
        while world.ascend(&assets, &mut events).unwrap().is_some() {}
        assert_eq!(world.active().node_id, 0);
        assert_eq!(world.active().matrix(), pristine.as_slice());
    }

    #[test]
    fn test_same_base_seed_same_dungeon() {
        let assets = AssetCatalog::with_defaults();
        let mut a = WorldGraph::new(config(), &assets).unwrap();
        let mut b = WorldGraph::new(config(), &assets).unwrap();
        let mut events = EventQueue::new();
        a.descend(TransitionCause::Stair, &assets, &mut events).unwrap();
        b.descend(TransitionCause::Stair, &assets, &mut events).unwrap();
        assert_eq!(a.active().matrix(), b.active().matrix());
    }

    #[test]
    fn test_failed_generation_keeps_active_level() {
        let assets = AssetCatalog::with_defaults();
        let mut world = WorldGraph::new(config(), &assets).unwrap();
        world.config.map_size = 0;
        let mut events = EventQueue::new();
        assert!(world.descend(TransitionCause::Stair, &assets, &mut events).is_err());
        assert_eq!(world.active().node_id, 0);
        assert_eq!(world.map_level(), 1);
        assert!(events.is_empty());
    }
}
