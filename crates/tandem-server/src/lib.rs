//! Tandem production server.
//!
//! This crate provides the runtime around the sans-IO engine:
//! - Tokio for async runtime and TCP transport
//! - One line-oriented connection per participant
//! - A single mutex serializing all engine access
//!
//! ## Architecture
//!
//! ```text
//! tandem-server
//!   ├─ Server              (TCP accept loop)
//!   ├─ ConnectionRegistry  (participant → outbound channel)
//!   ├─ wire                (line protocol parse/render)
//!   └─ Engine              (tandem-core, behind Arc<Mutex<_>>)
//! ```
//!
//! Every inbound event is processed under the engine mutex — the global
//! critical section that keeps concurrent `request_match`/`skip`/`leave`
//! calls atomic with respect to each other. The lock is never held across
//! outbound I/O: notifications are collected under the lock and delivered
//! after it is released. A failed delivery is logged and counted; the
//! engine mutation it belonged to is already final.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod registry;
pub mod wire;

use std::sync::Arc;

pub use error::ServerError;
pub use registry::{BroadcastReport, ConnectionRegistry, DeliveryError};
use tandem_core::{Engine, EngineConfig, Event, ParticipantId, Payload};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::{Mutex, mpsc},
};

use crate::wire::Command;

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:7400")
    pub bind_address: String,
    /// Token that grants access to `/stats` and `/broadcast`; `None`
    /// disables admin commands entirely.
    pub admin_token: Option<String>,
    /// Engine configuration (skip behavior)
    pub engine: EngineConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7400".to_string(),
            admin_token: None,
            engine: EngineConfig::default(),
        }
    }
}

/// Production tandem server.
///
/// Wraps the engine with a TCP line-protocol transport.
pub struct Server {
    listener: TcpListener,
    engine: Arc<Mutex<Engine>>,
    registry: Arc<ConnectionRegistry>,
    admin_token: Option<String>,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;

        Ok(Self {
            listener,
            engine: Arc::new(Mutex::new(Engine::new(config.engine))),
            registry: Arc::new(ConnectionRegistry::new()),
            admin_token: config.admin_token,
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Run the server, accepting connections and processing events.
    ///
    /// This method runs until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!("accepted connection from {}", peer);
                    let engine = Arc::clone(&self.engine);
                    let registry = Arc::clone(&self.registry);
                    let admin_token = self.admin_token.clone();

                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, engine, registry, admin_token).await
                        {
                            tracing::debug!("connection error: {}", e);
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("accept error: {}", e);
                },
            }
        }
    }
}

/// Handle a single participant connection.
async fn handle_connection(
    stream: TcpStream,
    engine: Arc<Mutex<Engine>>,
    registry: Arc<ConnectionRegistry>,
    admin_token: Option<String>,
) -> Result<(), ServerError> {
    let participant = {
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf).map_err(|e| ServerError::Internal(e.to_string()))?;
        u64::from_le_bytes(buf)
    };

    tracing::debug!("new participant: {}", participant);

    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    registry.register(participant, tx.clone()).await;

    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    for line in wire::welcome_lines() {
        let _ = tx.send(line);
    }

    let mut lines = BufReader::new(reader).lines();
    let mut is_admin = false;

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = wire::parse_line(&line) else {
            continue;
        };

        match command {
            Command::Start => {
                process_event(Event::Start { participant }, &engine, &registry).await;
            },
            Command::Next => {
                process_event(Event::Skip { participant }, &engine, &registry).await;
            },
            Command::End => {
                process_event(Event::End { participant }, &engine, &registry).await;
            },
            Command::Say(text) => {
                let event = Event::Message { participant, payload: Payload::Text(text) };
                process_event(event, &engine, &registry).await;
            },
            Command::Help => {
                for line in wire::help_lines() {
                    let _ = tx.send(line);
                }
            },
            Command::Admin(token) => {
                is_admin = admin_token.as_deref().is_some_and(|expected| expected == token);
                if !is_admin {
                    tracing::warn!(participant, "failed admin authentication");
                }
                let _ = tx.send(wire::admin_reply(is_admin));
            },
            Command::Stats => {
                if is_admin {
                    let (all, pairs, waiting) = {
                        let engine = engine.lock().await;
                        (engine.count_all(), engine.count_active_pairs(), engine.count_waiting())
                    };
                    let _ = tx.send(wire::stats_line(all, pairs, waiting));
                } else {
                    let _ = tx.send(wire::not_authorized());
                }
            },
            Command::Broadcast(text) => {
                if is_admin {
                    let targets: Vec<ParticipantId> =
                        { engine.lock().await.known_participants().collect() };
                    let report = registry.broadcast(&targets, &wire::broadcast_line(&text)).await;
                    tracing::info!(
                        delivered = report.delivered,
                        failed = report.failed,
                        "broadcast complete"
                    );
                    let _ = tx.send(wire::broadcast_report_line(&report));
                } else {
                    let _ = tx.send(wire::not_authorized());
                }
            },
            Command::Unknown(keyword) => {
                let _ = tx.send(wire::unknown_command(&keyword));
            },
        }
    }

    // A dropped connection counts as leaving: the partner must not stay
    // paired with a ghost. The notification addressed to the gone
    // participant fails delivery and is counted like any other.
    process_event(Event::End { participant }, &engine, &registry).await;
    registry.unregister(participant).await;
    write_task.abort();

    tracing::debug!("participant disconnected: {}", participant);
    Ok(())
}

/// Process one event under the engine mutex, then deliver the resulting
/// notifications with the lock released.
async fn process_event(
    event: Event,
    engine: &Mutex<Engine>,
    registry: &ConnectionRegistry,
) {
    let notifications = { engine.lock().await.handle(event) };

    for notification in notifications {
        let line = wire::render_notification(&notification.body);
        if let Err(e) = registry.deliver(notification.recipient, line).await {
            tracing::warn!("delivery failed: {}", e);
        }
    }
}
