//! Shared state for anything alive in the world.
//!
//! Health, stamina and mana live on a half-point grid and never go negative.
//! They are private so the only way to change them is through the methods
//! below, which keep that invariant.

use crate::assets::{SoundHandle, TextureHandle};
use crate::constants::*;
use crate::events::{Actor, EventQueue, GameEvent};
use crate::rect::Rect;
use glam::Vec2;

/// Snap a vital down to the nearest lower half point, never below zero
pub fn snap_vital(value: f32) -> f32 {
    let snapped = (value / VITAL_STEP).floor() * VITAL_STEP;
    if snapped > 0.0 {
        snapped
    } else {
        0.0
    }
}

/// Axis for per-axis collision resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// What a damage call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Lost health, still alive
    Hurt,
    /// This call brought health to zero
    Died,
    /// Already dead; nothing happened
    AlreadyDead,
    /// Amount was zero or negative
    NoEffect,
}

/// Starting vitals and combat stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub health: f32,
    pub stamina: f32,
    pub mana: f32,
    pub damage: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub texture: TextureHandle,
    /// Sprite sub-rectangle for the current animation frame
    pub frame_rec: Rect,
    pub spawn_point: Vec2,
    /// Top-left corner in world units
    pub position: Vec2,
    /// Position at the start of the current frame
    pub last_position: Vec2,
    pub take_damage_sound: SoundHandle,
    pub death_sound: SoundHandle,
    health: f32,
    stamina: f32,
    mana: f32,
    max_health: f32,
    max_stamina: f32,
    max_mana: f32,
    pub damage: f32,
    pub speed: f32,
    is_alive: bool,
    pub is_attacking: bool,
    pub is_moving: bool,
    pub is_player: bool,
    /// Edge length of the square hitbox / sprite in world units
    pub size: f32,
}

impl Entity {
    pub fn new(texture: TextureHandle, spawn_point: Vec2, size: f32, stats: Stats) -> Self {
        let health = snap_vital(stats.health);
        let stamina = snap_vital(stats.stamina);
        let mana = snap_vital(stats.mana);
        Self {
            texture,
            frame_rec: Rect::new(0.0, 0.0, size, size),
            spawn_point,
            position: spawn_point,
            last_position: spawn_point,
            take_damage_sound: SoundHandle::SILENT,
            death_sound: SoundHandle::SILENT,
            health,
            stamina,
            mana,
            max_health: health,
            max_stamina: stamina,
            max_mana: mana,
            damage: snap_vital(stats.damage),
            speed: stats.speed,
            is_alive: health > 0.0,
            is_attacking: false,
            is_moving: false,
            is_player: false,
            size,
        }
    }

    pub fn with_sounds(mut self, take_damage: SoundHandle, death: SoundHandle) -> Self {
        self.take_damage_sound = take_damage;
        self.death_sound = death;
        self
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn mana(&self) -> f32 {
        self.mana
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Snapshot the position before any movement this frame
    pub fn begin_frame(&mut self) {
        self.last_position = self.position;
    }

    /// Undo this frame's movement along one axis
    pub fn revert_axis(&mut self, axis: Axis) {
        match axis {
            Axis::X => self.position.x = self.last_position.x,
            Axis::Y => self.position.y = self.last_position.y,
        }
    }

    pub fn hitbox(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(self.size * 0.5)
    }

    /// Put the entity at a new spawn point, e.g. on level entry
    pub fn respawn_at(&mut self, spawn_point: Vec2) {
        self.spawn_point = spawn_point;
        self.position = spawn_point;
        self.last_position = spawn_point;
        self.is_moving = false;
        self.is_attacking = false;
    }

    /// Apply damage.
    ///
    /// Health snaps down to a half point and stops at zero. Reaching zero
    /// kills the entity and plays the death sound once; any later call is a
    /// no-op. Non-lethal hits play the hurt sound and leave the movement and
    /// attack flags alone.
    pub fn take_damage(&mut self, amount: f32, actor: Actor, events: &mut EventQueue) -> DamageOutcome {
        if !self.is_alive {
            return DamageOutcome::AlreadyDead;
        }
        if !(amount > 0.0) {
            return DamageOutcome::NoEffect;
        }

        self.health = snap_vital(self.health - amount);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_alive = false;
            events.play(self.death_sound);
            events.push(GameEvent::Died {
                actor,
                position: self.center(),
            });
            DamageOutcome::Died
        } else {
            events.play(self.take_damage_sound);
            events.push(GameEvent::Damaged {
                actor,
                amount,
                remaining: self.health,
            });
            DamageOutcome::Hurt
        }
    }

    /// Restore health up to the maximum. Death is permanent: healing a dead
    /// entity does nothing.
    pub fn heal(&mut self, amount: f32) {
        if !self.is_alive || !(amount > 0.0) {
            return;
        }
        self.health = snap_vital((self.health + amount).min(self.max_health));
    }

    /// Spend stamina if there is enough. Returns whether it was spent.
    pub fn spend_stamina(&mut self, cost: f32) -> bool {
        if self.stamina < cost {
            return false;
        }
        self.stamina = snap_vital(self.stamina - cost);
        true
    }

    pub fn restore_stamina(&mut self, amount: f32) {
        if amount > 0.0 {
            self.stamina = snap_vital((self.stamina + amount).min(self.max_stamina));
        }
    }

    /// Spend mana if there is enough. Returns whether it was spent.
    pub fn spend_mana(&mut self, cost: f32) -> bool {
        if self.mana < cost {
            return false;
        }
        self.mana = snap_vital(self.mana - cost);
        true
    }

    pub fn restore_mana(&mut self, amount: f32) {
        if amount > 0.0 {
            self.mana = snap_vital((self.mana + amount).min(self.max_mana));
        }
    }

    /// Overwrite health from a peer's snapshot. Death still sticks: a dead
    /// entity stays dead whatever the snapshot says.
    pub(crate) fn sync_vitals(&mut self, health: f32, alive: bool) {
        self.is_alive = self.is_alive && alive;
        self.health = if self.is_alive { snap_vital(health) } else { 0.0 };
        if self.health <= 0.0 {
            self.is_alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats(health: f32) -> Stats {
        Stats {
            health,
            stamina: 2.0,
            mana: 1.0,
            damage: 1.0,
            speed: 10.0,
        }
    }

    fn entity(health: f32) -> Entity {
        Entity::new(TextureHandle(1), Vec2::ZERO, 32.0, stats(health))
            .with_sounds(SoundHandle(10), SoundHandle(11))
    }

    #[test]
    fn test_snap_vital() {
        assert_eq!(snap_vital(2.7), 2.5);
        assert_eq!(snap_vital(3.0), 3.0);
        assert_eq!(snap_vital(0.4), 0.0);
        assert_eq!(snap_vital(-1.0), 0.0);
    }

    #[test]
    fn test_lethal_damage_fires_death_sound_once() {
        let mut e = entity(0.5);
        let mut events = EventQueue::new();

        assert_eq!(e.take_damage(1.0, Actor::Enemy(0), &mut events), DamageOutcome::Died);
        assert_eq!(
            e.take_damage(1.0, Actor::Enemy(0), &mut events),
            DamageOutcome::AlreadyDead
        );

        assert_eq!(e.health(), 0.0);
        assert!(!e.is_alive());
        assert_eq!(events.count_sound(SoundHandle(11)), 1);
        assert_eq!(events.count_sound(SoundHandle(10)), 0);
    }

    #[test]
    fn test_non_lethal_damage_keeps_flags() {
        let mut e = entity(3.0);
        e.is_moving = true;
        e.is_attacking = true;
        let mut events = EventQueue::new();

        assert_eq!(e.take_damage(0.3, Actor::Player, &mut events), DamageOutcome::Hurt);
        assert_eq!(e.health(), 2.5);
        assert!(e.is_moving && e.is_attacking);
        assert_eq!(events.count_sound(SoundHandle(10)), 1);
    }

    #[test]
    fn test_zero_damage_is_no_effect() {
        let mut e = entity(3.0);
        let mut events = EventQueue::new();
        assert_eq!(e.take_damage(0.0, Actor::Player, &mut events), DamageOutcome::NoEffect);
        assert!(events.is_empty());
    }

    #[test]
    fn test_death_is_permanent() {
        let mut e = entity(1.0);
        let mut events = EventQueue::new();
        e.take_damage(5.0, Actor::Player, &mut events);
        e.heal(3.0);
        assert_eq!(e.health(), 0.0);
        assert!(!e.is_alive());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut e = entity(3.0);
        let mut events = EventQueue::new();
        e.take_damage(2.0, Actor::Player, &mut events);
        e.heal(10.0);
        assert_eq!(e.health(), 3.0);
    }

    #[test]
    fn test_stamina_spend_and_restore() {
        let mut e = entity(3.0);
        assert!(e.spend_stamina(1.5));
        assert_eq!(e.stamina(), 0.5);
        assert!(!e.spend_stamina(1.0));
        e.restore_stamina(4.0);
        assert_eq!(e.stamina(), e.max_stamina());
    }

    #[test]
    fn test_revert_axis_only_touches_one_axis() {
        let mut e = entity(3.0);
        e.begin_frame();
        e.position += Vec2::new(4.0, 6.0);
        e.revert_axis(Axis::X);
        assert_eq!(e.position, Vec2::new(0.0, 6.0));
    }

    #[test]
    fn test_sync_vitals_keeps_death_monotonic() {
        let mut e = entity(3.0);
        e.sync_vitals(1.7, true);
        assert_eq!(e.health(), 1.5);
        assert!(e.is_alive());

        e.sync_vitals(0.0, false);
        assert!(!e.is_alive());
        e.sync_vitals(3.0, true);
        assert!(!e.is_alive());
        assert_eq!(e.health(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_health_stays_on_half_grid(hits in proptest::collection::vec(0.0f32..3.0, 0..20)) {
            let mut e = entity(10.0);
            let mut events = EventQueue::new();
            for hit in hits {
                e.take_damage(hit, Actor::Player, &mut events);
                let h = e.health();
                prop_assert!(h >= 0.0);
                prop_assert_eq!((h * 2.0).fract(), 0.0);
                prop_assert_eq!(e.is_alive(), h > 0.0);
            }
        }
    }
}
