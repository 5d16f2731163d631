//! Headless session runner.
//!
//!   dungeon-delve --seed 42 --size 40 --frames 3600
//!   dungeon-delve --host 0.0.0.0:7777
//!   dungeon-delve --connect 192.168.1.20
//!   dungeon-delve --menu "down enter down enter enter"

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_delve::assets::AssetCatalog;
use dungeon_delve::audio::{AudioSink, NullAudio, RodioAudio};
use dungeon_delve::autopilot::Autopilot;
use dungeon_delve::constants::*;
use dungeon_delve::events::EventQueue;
use dungeon_delve::input::Key;
use dungeon_delve::menu::{Launch, MenuState};
use dungeon_delve::network::{self, HostListener, WorldParams};
use dungeon_delve::{GameConfig, Session};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dungeon-delve")]
#[command(about = "Run a dungeon session without a window")]
struct Cli {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    size: Option<usize>,

    /// Logical frames to simulate before stopping
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Wait for a peer on this address
    #[arg(long, conflicts_with = "connect")]
    host: Option<String>,

    /// Join a host at this address (port optional)
    #[arg(long)]
    connect: Option<String>,

    /// Drive the title menu with a key script instead of the flags above
    #[arg(long, conflicts_with_all = ["host", "connect"])]
    menu: Option<String>,

    /// Directory with sound files; plays through the default output device
    #[arg(long)]
    sounds: Option<PathBuf>,

    /// Serve puffin profiling data
    #[arg(long)]
    profile: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.map_seed = seed;
    }
    if let Some(size) = cli.size {
        config.map_size = size;
    }

    let mut host = cli.host.clone();
    let mut connect = cli.connect.clone();
    if let Some(script) = &cli.menu {
        let mut menu = MenuState::new(&config, &AssetCatalog::with_defaults());
        let launch = menu.run(Key::parse_script(script), &mut EventQueue::new());
        menu.apply_to(&mut config);
        info!("menu: {launch:?}");
        match launch {
            Launch::Offline => {}
            Launch::Host(addr) => host = Some(addr),
            Launch::Connect(addr) => connect = Some(addr),
            Launch::Quit => return Ok(()),
        }
    }

    let _profiler = if cli.profile {
        puffin::set_scopes_on(true);
        let addr = format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        info!("puffin server on {addr}");
        Some(puffin_http::Server::new(&addr).context("starting puffin server")?)
    } else {
        None
    };

    let runtime = tokio::runtime::Runtime::new().context("starting network runtime")?;

    // The connection is settled before the first frame
    let connection = if let Some(addr) = &host {
        let world = WorldParams::from_config(&config);
        let conn = runtime.block_on(async {
            let listener = HostListener::bind(addr).await?;
            info!("hosting on {}", listener.local_addr()?);
            listener.accept(world, HANDSHAKE_TIMEOUT_SECS).await
        })?;
        Some(conn)
    } else if let Some(addr) = &connect {
        let addr = network::parse_address(addr)?;
        let conn = runtime.block_on(network::connect(addr, HANDSHAKE_TIMEOUT_SECS))?;
        conn.world.apply_to(&mut config);
        Some(conn)
    } else {
        None
    };

    let assets = AssetCatalog::with_defaults();
    let audio: Box<dyn AudioSink> = match &cli.sounds {
        Some(dir) => match RodioAudio::new() {
            Ok(mut sink) => {
                sink.load_dir(dir, &assets);
                Box::new(sink)
            }
            Err(e) => {
                warn!("{e}; running silent");
                Box::new(NullAudio::default())
            }
        },
        None => Box::new(NullAudio::default()),
    };

    let mut session = Session::new(config.clone(), assets, audio)?;
    if let Some(conn) = connection {
        let _guard = runtime.enter();
        session.attach_peer(conn.into_link());
    }

    let mut pilot = Autopilot::new();
    let frame_dt = config.frame_duration;
    while session.clock().current_frame < cli.frames {
        puffin::GlobalProfiler::lock().new_frame();
        session.frame(frame_dt, &mut pilot)?;
        if session.is_over() {
            info!("player died on level {}", session.map_level());
            break;
        }
    }

    let player = session.player();
    info!(
        "reached level {} with {} health after {} frames",
        session.map_level(),
        player.entity.health(),
        session.clock().current_frame
    );
    session.shutdown();
    // Give the writer task a moment to send the goodbye
    runtime.shutdown_timeout(std::time::Duration::from_millis(200));
    Ok(())
}
