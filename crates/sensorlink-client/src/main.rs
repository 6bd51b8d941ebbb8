//! sensorlink client entry point.
//!
//! Loads the configuration, wires the connection manager to a channel-backed
//! event sink, and runs a terminal front-end over stdin.
//!
//! # Usage
//!
//! ```text
//! sensorlink-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>   TOML config file [default: sensorlink.toml]
//!                     [env: SENSORLINK_CONFIG]
//!   --host   <HOST>   server host, overrides [server] host
//!                     [env: SENSORLINK_HOST]
//!   --port   <PORT>   server port, overrides [server] port
//!                     [env: SENSORLINK_PORT]
//!   --connect         connect at startup
//!   --init-config     write the effective config to --config and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ ConnectionManager        -- one TCP session, receive loop per session
//!  └─ SubmitStateUseCase       -- outbox task, sends in command order
//!  └─ select! loop
//!       ├─ stdin line   -> Command -> manager / draft / outbox
//!       ├─ SensorEvent  -> print, reseed the draft
//!       └─ Ctrl-C       -> disconnect and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sensorlink_client::application::{
    ChannelSink, SensorDraft, SensorEvent, SubmitStateUseCase,
};
use sensorlink_client::infrastructure::console::{Command, HELP};
use sensorlink_client::infrastructure::network::{ConnectionError, ConnectionManager};
use sensorlink_client::infrastructure::storage::config::{
    load_config, save_config, ClientConfig,
};
use sensorlink_core::SensorState;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Terminal client for a vehicle sensor server.
#[derive(Debug, Parser)]
#[command(
    name = "sensorlink-client",
    about = "Exchange SensorState records with a sensor server over TCP",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.  A missing file means defaults.
    #[arg(long, default_value = "sensorlink.toml", env = "SENSORLINK_CONFIG")]
    config: PathBuf,

    /// Server host name or IP address.
    #[arg(long, env = "SENSORLINK_HOST")]
    host: Option<String>,

    /// Server TCP port.
    #[arg(long, env = "SENSORLINK_PORT")]
    port: Option<u16>,

    /// Connect to the configured server immediately.
    #[arg(long)]
    connect: bool,

    /// Write the effective configuration (file plus flags) to `--config`
    /// and exit.
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    /// Overlays the flags that were given on top of the file configuration.
    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

// ── Console session ───────────────────────────────────────────────────────────

struct Console {
    manager: Arc<ConnectionManager>,
    /// Queue drained by the submit use case's outbox task.
    outbox: UnboundedSender<SensorState>,
    latest: Option<SensorState>,
    draft: SensorDraft,
    /// Set once the user edits the draft; inbound records stop reseeding it.
    edited: bool,
}

impl Console {
    fn on_event(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Received(state) => {
                println!("<- {state}");
                self.latest = Some(state);
                if !self.edited {
                    self.draft = SensorDraft::seeded(self.latest);
                }
            }
            SensorEvent::Error { kind, message } => {
                println!("!! {kind} error: {message}");
            }
        }
    }

    /// Runs one command.  Returns `false` when the user asked to quit.
    ///
    /// A connect runs on its own task so a slow handshake never blocks
    /// stdin or Ctrl-C.
    async fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::Connect { host, port } => {
                let config = self.manager.config();
                let host = host.unwrap_or_else(|| config.host.clone());
                let port = port.unwrap_or(config.port);
                let manager = Arc::clone(&self.manager);
                println!("connecting to {host}:{port}");
                tokio::spawn(async move {
                    match manager.connect(&host, port).await {
                        Ok(conn) => {
                            println!("connected to {} (session {})", conn.peer_addr(), conn.id());
                        }
                        Err(e @ ConnectionError::Aborted { .. }) => println!("!! {e}"),
                        // Reported through the sink and printed there.
                        Err(_) => {}
                    }
                });
            }
            Command::Disconnect => match self.manager.disconnect().await {
                Ok(()) => println!("disconnected"),
                Err(e) => println!("!! disconnect failed: {e}"),
            },
            Command::Show => {
                println!("draft:  {}", self.draft.state());
                match self.latest {
                    Some(state) => println!("latest: {state}"),
                    None => println!("latest: nothing received yet"),
                }
            }
            Command::Set { field, value } => match self.draft.apply(field, &value) {
                Ok(()) => {
                    self.edited = true;
                    println!("draft:  {}", self.draft.state());
                }
                Err(e) => println!("!! {e}"),
            },
            Command::Send => {
                let state = self.draft.state();
                // Send errors reach the sink; the stdin loop stays responsive.
                match self.outbox.send(state) {
                    Ok(()) => println!("-> {state}"),
                    Err(_) => println!("!! send queue is closed"),
                }
                self.edited = false;
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    if cli.init_config {
        save_config(&cli.config, &config)
            .with_context(|| format!("writing config to {}", cli.config.display()))?;
        println!("wrote {}", cli.config.display());
        return Ok(());
    }

    // Initialise structured logging; RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let connection_config = config
        .to_connection_config()
        .context("invalid client configuration")?;
    info!(
        server = %format!("{}:{}", connection_config.host, connection_config.port),
        "sensorlink client starting"
    );

    let (sink, mut events) = ChannelSink::new();
    let sink = Arc::new(sink);
    let manager = Arc::new(ConnectionManager::new(connection_config, sink.clone()));
    let submit = Arc::new(SubmitStateUseCase::new(manager.clone(), sink));
    let (outbox, outbox_task) = submit.spawn_outbox();

    let mut console = Console {
        manager: Arc::clone(&manager),
        outbox,
        latest: None,
        draft: SensorDraft::default(),
        edited: false,
    };

    println!("{HELP}");
    if cli.connect {
        console.on_command(Command::Connect { host: None, port: None }).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("shutdown signal received");
                break;
            }
            Some(event) = events.recv() => console.on_event(event),
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if !console.on_command(command).await {
                            break;
                        }
                    }
                    Err(e) => println!("!! {e}; type `help` for commands"),
                }
            }
        }
    }

    // Records still queued at exit are dropped.
    drop(console);
    outbox_task.abort();
    if let Err(e) = manager.disconnect().await {
        warn!("error closing connection on shutdown: {e}");
    }
    info!("sensorlink client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
