//! Two-player session link over TCP.
//!
//! Connection setup (bind, accept or dial, handshake) happens before the
//! frame loop starts. After that the link runs on background tasks and the
//! frame loop only ever touches two channels: it queues outgoing state with
//! `PeerLink::send_state` and drains whatever arrived with `PeerLink::poll`
//! between frames.
//!
//! Frames are a big-endian `u32` length followed by a bincode `NetMessage`.

use crate::assets::TextureHandle;
use crate::config::{Difficulty, GameConfig};
use crate::constants::*;
use crate::entity::{Entity, Stats};
use crate::error::NetworkError;
use crate::player::Player;
use crate::rect::Rect;
use crate::render::{DrawCommand, Layer};
use glam::Vec2;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// How this process takes part in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Offline,
    Host,
    Client,
}

/// Everything that shapes a generated level. The host sends its own and the
/// client adopts them, so both sides build identical levels and rosters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldParams {
    pub seed: u64,
    pub size: u32,
    pub tile_size: f32,
    pub difficulty: Difficulty,
    pub enemies_per_level: u32,
    pub aggro_radius_tiles: f32,
    pub melee_range_tiles: f32,
    pub enemy_attack_cooldown: f32,
    pub fall_damage: f32,
}

impl WorldParams {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            seed: config.map_seed,
            size: config.map_size as u32,
            tile_size: config.tile_size,
            difficulty: config.difficulty,
            enemies_per_level: config.enemies_per_level as u32,
            aggro_radius_tiles: config.aggro_radius_tiles,
            melee_range_tiles: config.melee_range_tiles,
            enemy_attack_cooldown: config.enemy_attack_cooldown,
            fall_damage: config.fall_damage,
        }
    }

    /// Overwrite the world-shaping fields of a local config
    pub fn apply_to(&self, config: &mut GameConfig) {
        config.map_seed = self.seed;
        config.map_size = self.size as usize;
        config.tile_size = self.tile_size;
        config.difficulty = self.difficulty;
        config.enemies_per_level = self.enemies_per_level as usize;
        config.aggro_radius_tiles = self.aggro_radius_tiles;
        config.melee_range_tiles = self.melee_range_tiles;
        config.enemy_attack_cooldown = self.enemy_attack_cooldown;
        config.fall_damage = self.fall_damage;
    }
}

/// Snapshot of a player sent to the peer every logical frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerState {
    pub node_id: i32,
    pub position: [f32; 2],
    /// Sprite source rectangle: x, y, width, height
    pub frame: [f32; 4],
    pub health: f32,
    pub is_alive: bool,
    pub is_moving: bool,
    pub is_attacking: bool,
}

impl PeerState {
    pub fn from_player(player: &Player, node_id: i32) -> Self {
        let e = &player.entity;
        Self {
            node_id,
            position: [e.position.x, e.position.y],
            frame: [e.frame_rec.x, e.frame_rec.y, e.frame_rec.width, e.frame_rec.height],
            health: e.health(),
            is_alive: e.is_alive(),
            is_moving: e.is_moving,
            is_attacking: e.is_attacking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetMessage {
    /// The host's hello carries the world; the client's carries none
    Hello { version: u16, world: Option<WorldParams> },
    State(PeerState),
    Bye,
}

impl NetMessage {
    pub fn encode(&self) -> Result<Vec<u8>, NetworkError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, NetworkError> {
        Ok(bincode::deserialize(data)?)
    }
}

/// Parse what the player typed. A bare IP gets the default port.
pub fn parse_address(input: &str) -> Result<SocketAddr, NetworkError> {
    let trimmed = input.trim();
    if let Ok(addr) = trimmed.parse::<SocketAddr>() {
        return Ok(addr);
    }
    trimmed
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_PORT))
        .map_err(|_| NetworkError::InvalidAddress(input.to_string()))
}

pub async fn write_frame<W>(writer: &mut W, message: &NetMessage) -> Result<(), NetworkError>
where
    W: AsyncWrite + Unpin,
{
    let body = message.encode()?;
    if body.len() > MAX_FRAME_BYTES {
        return Err(NetworkError::FrameTooLarge(body.len()));
    }
    writer.write_u32(body.len() as u32).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_frame<R>(reader: &mut R) -> Result<NetMessage, NetworkError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(NetworkError::Closed),
        Err(e) => return Err(e.into()),
    };
    if len > MAX_FRAME_BYTES {
        return Err(NetworkError::FrameTooLarge(len));
    }
    let mut body = vec![0u8; len];
    match reader.read_exact(&mut body).await {
        Ok(_) => NetMessage::decode(&body),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(NetworkError::Closed),
        Err(e) => Err(e.into()),
    }
}

async fn with_timeout<T>(
    secs: u64,
    fut: impl std::future::Future<Output = Result<T, NetworkError>>,
) -> Result<T, NetworkError> {
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| NetworkError::Timeout(secs))?
}

/// A host waiting for its peer
pub struct HostListener {
    listener: TcpListener,
}

impl HostListener {
    pub async fn bind(addr: &str) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| NetworkError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self { listener })
    }

    /// Address to advertise to the peer
    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one peer and tell it which world to build.
    pub async fn accept(self, world: WorldParams, timeout_secs: u64) -> Result<Connection, NetworkError> {
        with_timeout(timeout_secs, async {
            let (mut stream, peer) = self.listener.accept().await.map_err(NetworkError::Accept)?;
            info!("peer connected from {peer}");

            match read_frame(&mut stream).await? {
                NetMessage::Hello { version, .. } if version == PROTOCOL_VERSION => {}
                NetMessage::Hello { version, .. } => {
                    return Err(NetworkError::VersionMismatch {
                        ours: PROTOCOL_VERSION,
                        theirs: version,
                    })
                }
                _ => return Err(NetworkError::Handshake),
            }
            write_frame(
                &mut stream,
                &NetMessage::Hello {
                    version: PROTOCOL_VERSION,
                    world: Some(world),
                },
            )
            .await?;

            Ok(Connection {
                stream,
                peer,
                role: SessionRole::Host,
                world,
            })
        })
        .await
    }
}

/// Dial a host and adopt its world parameters.
pub async fn connect(addr: SocketAddr, timeout_secs: u64) -> Result<Connection, NetworkError> {
    with_timeout(timeout_secs, async {
        let mut stream = TcpStream::connect(addr).await.map_err(|source| NetworkError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        write_frame(
            &mut stream,
            &NetMessage::Hello {
                version: PROTOCOL_VERSION,
                world: None,
            },
        )
        .await?;

        let world = match read_frame(&mut stream).await? {
            NetMessage::Hello {
                version,
                world: Some(world),
            } if version == PROTOCOL_VERSION => world,
            NetMessage::Hello { version, .. } => {
                return Err(NetworkError::VersionMismatch {
                    ours: PROTOCOL_VERSION,
                    theirs: version,
                })
            }
            _ => return Err(NetworkError::Handshake),
        };
        info!(
            "joined {addr}: seed={} size={} difficulty={}",
            world.seed,
            world.size,
            world.difficulty.name()
        );

        Ok(Connection {
            stream,
            peer: addr,
            role: SessionRole::Client,
            world,
        })
    })
    .await
}

/// A socket that finished the handshake
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    pub peer: SocketAddr,
    pub role: SessionRole,
    pub world: WorldParams,
}

/// Something the peer did, buffered for the next frame boundary
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    State(PeerState),
    Lost,
}

impl Connection {
    /// Hand the socket to background tasks. Must be called inside a tokio
    /// runtime, which has to outlive the returned link.
    pub fn into_link(self) -> PeerLink {
        let (mut reader, mut writer) = self.stream.into_split();
        let (out_tx, mut out_rx) = mpsc::channel::<NetMessage>(PEER_SEND_QUEUE);
        let (in_tx, in_rx) = mpsc::unbounded_channel::<PeerEvent>();

        let reader_task = tokio::spawn(async move {
            loop {
                match read_frame(&mut reader).await {
                    Ok(NetMessage::State(state)) => {
                        if in_tx.send(PeerEvent::State(state)).is_err() {
                            break;
                        }
                    }
                    Ok(NetMessage::Bye) => {
                        debug!("peer said goodbye");
                        let _ = in_tx.send(PeerEvent::Lost);
                        break;
                    }
                    Ok(NetMessage::Hello { .. }) => warn!("ignoring late hello"),
                    Err(e) => {
                        warn!("peer link read failed: {e}");
                        let _ = in_tx.send(PeerEvent::Lost);
                        break;
                    }
                }
            }
        });

        let writer_task = tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                let bye = message == NetMessage::Bye;
                if let Err(e) = write_frame(&mut writer, &message).await {
                    warn!("peer link write failed: {e}");
                    break;
                }
                if bye {
                    break;
                }
            }
        });

        PeerLink {
            peer: self.peer,
            role: self.role,
            outgoing: out_tx,
            incoming: in_rx,
            tasks: vec![reader_task, writer_task],
            lost: false,
            dropped_states: 0,
        }
    }
}

/// Running link to the peer
#[derive(Debug)]
pub struct PeerLink {
    pub peer: SocketAddr,
    pub role: SessionRole,
    outgoing: mpsc::Sender<NetMessage>,
    incoming: mpsc::UnboundedReceiver<PeerEvent>,
    tasks: Vec<JoinHandle<()>>,
    lost: bool,
    dropped_states: u64,
}

impl PeerLink {
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Queue our state for the peer. Never blocks: while the queue is full
    /// the snapshot is dropped, since a newer one follows next frame.
    pub fn send_state(&mut self, state: PeerState) -> Result<(), NetworkError> {
        match self.outgoing.try_send(NetMessage::State(state)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped_states += 1;
                if self.dropped_states % PEER_SEND_QUEUE as u64 == 1 {
                    debug!("peer writer behind; {} states dropped", self.dropped_states);
                }
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(NetworkError::Closed),
        }
    }

    /// Snapshots skipped because the writer fell behind
    pub fn dropped_states(&self) -> u64 {
        self.dropped_states
    }

    /// Everything that arrived since the last poll, oldest first
    pub fn poll(&mut self) -> Vec<PeerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.incoming.try_recv() {
            if event == PeerEvent::Lost {
                self.lost = true;
            }
            events.push(event);
        }
        events
    }

    /// Say goodbye and let the writer drain. If the queue is full the
    /// goodbye is skipped; the peer then sees the socket close instead.
    pub fn close(&mut self) {
        if self.outgoing.try_send(NetMessage::Bye).is_err() {
            debug!("goodbye not queued; peer will see the socket close");
        }
        self.lost = true;
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        // Writer exits on its own after Bye or when the sender drops
        if let Some(reader) = self.tasks.first() {
            reader.abort();
        }
    }
}

/// The peer's player as seen locally. Its state arrives as snapshots and is
/// fed into an ordinary `Entity` between frames.
#[derive(Debug, Clone)]
pub struct RemotePlayer {
    pub entity: Entity,
    /// Level the peer is on; `None` until the first snapshot
    node_id: Option<i32>,
}

impl RemotePlayer {
    pub fn new(texture: TextureHandle, size: f32) -> Self {
        let stats = Stats {
            health: PLAYER_STARTING_HEALTH,
            stamina: PLAYER_STARTING_STAMINA,
            mana: PLAYER_STARTING_MANA,
            damage: PLAYER_DAMAGE,
            speed: PLAYER_SPEED,
        };
        let mut entity = Entity::new(texture, Vec2::ZERO, size, stats);
        entity.is_player = true;
        Self { entity, node_id: None }
    }

    pub fn apply(&mut self, state: PeerState) {
        let e = &mut self.entity;
        e.begin_frame();
        e.position = Vec2::from(state.position);
        let [fx, fy, fw, fh] = state.frame;
        e.frame_rec = Rect::new(fx, fy, fw, fh);
        e.is_moving = state.is_moving;
        e.is_attacking = state.is_attacking;
        e.sync_vitals(state.health, state.is_alive);
        self.node_id = Some(state.node_id);
    }

    pub fn node_id(&self) -> Option<i32> {
        self.node_id
    }

    pub fn position(&self) -> Option<Vec2> {
        self.node_id.map(|_| self.entity.position)
    }

    /// Drawn only when alive and on the level being viewed
    pub fn draw(&self, node_id: i32) -> Option<DrawCommand> {
        if self.node_id != Some(node_id) || !self.entity.is_alive() {
            return None;
        }
        Some(DrawCommand {
            layer: Layer::RemotePlayer,
            texture: self.entity.texture,
            source: self.entity.frame_rec,
            dest: self.entity.hitbox(),
        })
    }
}
