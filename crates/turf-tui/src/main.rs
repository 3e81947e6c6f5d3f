//! Turf TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Local backend, default room
//! TURF_TOKEN=... turf-tui
//!
//! # Remote backend with logging and reconnects
//! turf-tui --api https://chat.example.com --token ... --room lobby \
//!     --reconnect-attempts 5 --log-file turf.log --log-level debug
//! ```

use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use turf_app::{App, Runtime, row_view_config};
use turf_client::{ClientConfig, Transport};
use turf_core::{ReconnectPolicy, RoomId, SessionConfig};
use turf_tui::TerminalDriver;

/// Turf terminal chat client
#[derive(Parser, Debug)]
#[command(name = "turf-tui")]
#[command(about = "Terminal client for Turf chat rooms")]
#[command(version)]
struct Args {
    /// REST API base URL
    #[arg(long, env = "TURF_API_BASE", default_value = "http://localhost:8000")]
    api: String,

    /// WebSocket base URL (derived from --api if omitted)
    #[arg(long, env = "TURF_WS_BASE")]
    ws: Option<String>,

    /// Bearer token for the API and the live connection
    #[arg(long, env = "TURF_TOKEN", hide_env_values = true)]
    token: String,

    /// Room to open on startup
    #[arg(short, long, default_value = "demo-room")]
    room: String,

    /// Your user id, needed for /dm and to highlight your messages
    #[arg(long, env = "TURF_USER_ID")]
    user_id: Option<String>,

    /// Messages per history page
    #[arg(long, default_value = "50")]
    page_size: usize,

    /// Maximum live messages kept in memory
    #[arg(long, default_value = "200")]
    capacity: usize,

    /// Automatic reconnect attempts after a dropped connection (0 disables)
    #[arg(long, default_value = "0")]
    reconnect_attempts: u32,

    /// Write logs to this file (stdout belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let room_id = RoomId::new(&args.room)?;
    let client = ClientConfig::new(&args.api, args.ws.as_deref(), args.token)?;
    tracing::info!(api = %client.api_base(), ws = %client.ws_base(), room = %room_id, "starting");

    let reconnect = if args.reconnect_attempts == 0 {
        ReconnectPolicy::disabled()
    } else {
        ReconnectPolicy::exponential(args.reconnect_attempts)
    };
    let config = SessionConfig {
        view: row_view_config(args.page_size, args.capacity),
        reconnect,
        jitter_seed: None,
    };

    let (transport, events) = Transport::new(client)?;
    let app = App::new(room_id, config, args.user_id);
    let driver = TerminalDriver::new(transport, events)?;

    Runtime::new(driver, app).run().await?;
    Ok(())
}
