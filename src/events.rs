//! Game event system for decoupled communication between systems.
//!
//! Updates push events instead of calling into audio or UI directly. The
//! session drains the queue between frames, so nothing reacts mid-update.

use crate::assets::SoundHandle;
use glam::Vec2;

/// Who an event is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Player,
    /// Index into the owning level's enemy roster
    Enemy(usize),
}

/// Why the player left a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    Stair,
    Hole,
    /// Climbed back to the level above
    StairUp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A sound should be played once
    PlaySound { sound: SoundHandle },
    /// An actor lost health but survived
    Damaged {
        actor: Actor,
        amount: f32,
        remaining: f32,
    },
    /// An actor's health reached zero
    Died { actor: Actor, position: Vec2 },
    /// A cracked wall was broken open
    TileBroken { x: usize, y: usize },
    /// The player moved to another level
    LevelChanged {
        from: i32,
        to: i32,
        cause: TransitionCause,
    },
    /// The network peer went away
    PeerLost,
}

/// Simple event queue - events are pushed during update, processed at end of frame
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: SoundHandle) {
        if sound != SoundHandle::SILENT {
            self.events.push(GameEvent::PlaySound { sound });
        }
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Pending events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// How many pending events request `sound`
    pub fn count_sound(&self, sound: SoundHandle) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlaySound { sound: s } if *s == sound))
            .count()
    }
}
