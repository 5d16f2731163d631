//! One running game: the context object the frame loop is driven through.
//!
//! Frame order is fixed: peer updates buffered since the last frame are
//! applied, the clock advances, then for each logical step the player
//! updates before the enemies. Drawing comes after every step, and the
//! camera moves last.

use crate::assets::{names, AssetCatalog};
use crate::audio::AudioSink;
use crate::autopilot::Autopilot;
use crate::camera::Camera2D;
use crate::clock::GameVariables;
use crate::config::GameConfig;
use crate::constants::*;
use crate::error::SessionError;
use crate::events::{EventQueue, GameEvent, TransitionCause};
use crate::input::{InputState, PlayerInput};
use crate::map::MapNode;
use crate::network::{PeerEvent, PeerLink, PeerState, RemotePlayer, SessionRole};
use crate::player::{Player, PlayerOutcome};
use crate::render::DrawList;
use crate::world::WorldGraph;
use log::{debug, info, warn};

/// Produces the player's intent for each logical step
pub trait Controller {
    fn next_input(&mut self, player: &Player, map: &MapNode, dt: f32) -> PlayerInput;

    /// Called after the player lands on another level
    fn level_changed(&mut self) {}
}

impl Controller for InputState {
    fn next_input(&mut self, _player: &Player, _map: &MapNode, _dt: f32) -> PlayerInput {
        self.player_input()
    }
}

impl Controller for Autopilot {
    fn next_input(&mut self, player: &Player, map: &MapNode, dt: f32) -> PlayerInput {
        Autopilot::next_input(self, player, map, dt)
    }

    fn level_changed(&mut self) {
        self.reset();
    }
}

/// What one call to `Session::frame` did
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Logical steps simulated
    pub steps: u32,
    pub outcomes: Vec<PlayerOutcome>,
    pub level_changes: u32,
    pub draw: DrawList,
}

pub struct Session {
    config: GameConfig,
    assets: AssetCatalog,
    clock: GameVariables,
    player: Player,
    world: WorldGraph,
    events: EventQueue,
    camera: Camera2D,
    audio: Box<dyn AudioSink>,
    role: SessionRole,
    link: Option<PeerLink>,
    remote: RemotePlayer,
    last_reap_frame: u32,
}

impl Session {
    /// Build the first level and place the player on it.
    pub fn new(config: GameConfig, assets: AssetCatalog, audio: Box<dyn AudioSink>) -> Result<Self, SessionError> {
        config.validate()?;
        let world = WorldGraph::new(config.clone(), &assets)?;
        let level = world.active();

        let player = Player::new(level.spawn_position(), config.tile_size, config.player_speed, &assets);
        let mut camera = Camera2D::new(config.viewport_width, config.viewport_height);
        camera.set_bounds(Some(level.bounds()));
        camera.snap_to(player.entity.center());

        let remote = RemotePlayer::new(assets.texture_or_placeholder(names::REMOTE_PLAYER), config.tile_size);
        info!(
            "session started: seed={} size={} difficulty={}",
            config.map_seed,
            config.map_size,
            config.difficulty.name()
        );

        Ok(Self {
            clock: GameVariables::new(config.frame_duration, config.max_frame_delta),
            config,
            assets,
            player,
            world,
            events: EventQueue::new(),
            camera,
            audio,
            role: SessionRole::Offline,
            link: None,
            remote,
            last_reap_frame: 0,
        })
    }

    /// Start feeding the peer. The link must already be connected.
    pub fn attach_peer(&mut self, link: PeerLink) {
        info!("peer attached: {} as {:?}", link.peer, link.role);
        self.role = link.role;
        self.link = Some(link);
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn level(&self) -> &MapNode {
        self.world.active()
    }

    pub fn world(&self) -> &WorldGraph {
        &self.world
    }

    pub fn clock(&self) -> &GameVariables {
        &self.clock
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn remote(&self) -> &RemotePlayer {
        &self.remote
    }

    pub fn map_level(&self) -> u32 {
        self.world.map_level()
    }

    pub fn is_over(&self) -> bool {
        !self.player.entity.is_alive()
    }

    /// Run one render frame of `real_dt` seconds.
    pub fn frame(&mut self, real_dt: f32, controller: &mut dyn Controller) -> Result<FrameReport, SessionError> {
        puffin::profile_function!();
        let mut report = FrameReport::default();

        self.apply_peer_events();

        report.steps = self.clock.update(real_dt);
        let dt = self.clock.frame_duration();
        let first = self.clock.current_frame.wrapping_sub(report.steps);
        for i in 1..=report.steps {
            let frame = first.wrapping_add(i);
            let node = self.world.active().node_id;
            let outcome = self.step(dt, frame, controller)?;
            if self.world.active().node_id != node {
                report.level_changes += 1;
            }
            report.outcomes.push(outcome);
        }

        self.flush_events();
        report.draw = self.draw();
        self.player.update_camera(&mut self.camera, self.clock.delta_time);
        Ok(report)
    }

    fn step(&mut self, dt: f32, frame: u32, controller: &mut dyn Controller) -> Result<PlayerOutcome, SessionError> {
        puffin::profile_scope!("logic_step");

        let input = controller.next_input(&self.player, self.world.active(), dt);
        let outcome = self
            .player
            .update(dt, frame, self.world.active_mut(), &input, &mut self.events);
        self.world
            .active_mut()
            .update_enemies(dt, frame, &mut self.player, &mut self.events);

        match outcome {
            PlayerOutcome::Stair => self.change_level(TransitionCause::Stair, controller)?,
            PlayerOutcome::Fell => {
                self.change_level(TransitionCause::Hole, controller)?;
                self.player.take_fall_damage(self.config.fall_damage, &mut self.events);
            }
            PlayerOutcome::StairUp => self.climb(controller)?,
            _ => {}
        }

        if frame.wrapping_sub(self.last_reap_frame) >= REAP_INTERVAL_FRAMES {
            self.world.active_mut().reap_dead();
            self.last_reap_frame = frame;
        }

        self.send_peer_state();
        Ok(outcome)
    }

    fn change_level(&mut self, cause: TransitionCause, controller: &mut dyn Controller) -> Result<(), SessionError> {
        let level = self.world.descend(cause, &self.assets, &mut self.events)?;
        self.player.enter_level(level.spawn_position());
        self.camera.set_bounds(Some(level.bounds()));
        self.camera.snap_to(self.player.entity.center());
        controller.level_changed();
        Ok(())
    }

    /// Back up one level, arriving beside that level's down stair
    fn climb(&mut self, controller: &mut dyn Controller) -> Result<(), SessionError> {
        let Some(level) = self.world.ascend(&self.assets, &mut self.events)? else {
            return Ok(());
        };
        self.player.enter_level(level.return_position());
        self.camera.set_bounds(Some(level.bounds()));
        self.camera.snap_to(self.player.entity.center());
        controller.level_changed();
        Ok(())
    }

    /// Peer updates only land here, between frames
    fn apply_peer_events(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        for event in link.poll() {
            match event {
                PeerEvent::State(state) => self.remote.apply(state),
                PeerEvent::Lost => {
                    warn!("peer {} lost", link.peer);
                    self.events.push(GameEvent::PeerLost);
                }
            }
        }
        if link.is_lost() {
            self.link = None;
        }
    }

    fn send_peer_state(&mut self) {
        let Some(link) = self.link.as_mut() else {
            return;
        };
        let state = PeerState::from_player(&self.player, self.world.active().node_id);
        if let Err(e) = link.send_state(state) {
            warn!("dropping peer link: {e}");
            self.link = None;
            self.events.push(GameEvent::PeerLost);
        }
    }

    /// Hand queued side effects to their consumers
    fn flush_events(&mut self) {
        for event in self.events.drain() {
            match event {
                GameEvent::PlaySound { sound } => self.audio.play(sound),
                GameEvent::Died { actor, position } => {
                    debug!("{actor:?} died at {position}");
                }
                _ => {}
            }
        }
    }

    /// Paint order: tiles, enemies, remote player, local player
    pub fn draw(&self) -> DrawList {
        puffin::profile_function!();
        let level = self.world.active();
        let mut list = level.draw_map(&self.camera);
        list.append(level.draw_enemies());
        if let Some(remote) = self.remote.draw(level.node_id) {
            list.push(remote);
        }
        list.push(self.player.draw());
        list
    }

    /// Say goodbye to the peer, if any
    pub fn shutdown(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }
        info!(
            "session ended on level {} after {} frames",
            self.world.map_level(),
            self.clock.current_frame
        );
    }
}
