#![allow(dead_code)]

//! Server orchestrator: listening socket, task pool, shared properties and
//! favicon, and the mutex-guarded client registry.
//!
//! The accept loop runs on the main thread and performs login synchronously
//! on the accepting path. A dedicated tick thread snapshots the registry
//! every 50 ms and dispatches one tick closure per registered session to
//! the task pool.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ferrocraft_config::ServerProperties;
use ferrocraft_pool::TaskPool;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::consts::{GAME_VERSION, GAMELOOP_SLEEP_TICK, PROTOCOL_VERSION};
use crate::network::ProtocolError;
use crate::network::status::{StatusDescription, StatusDocument, StatusPlayers, StatusVersion};
use crate::session::{LoginOutcome, Session};

pub type SharedSession = Arc<Mutex<Session>>;

/// Identifier -> session map. Mutable only under its mutex; entries are
/// inserted exactly once after login-acknowledge and removed exactly once
/// on disconnect.
#[derive(Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<Uuid, SharedSession>>,
}

impl ClientRegistry {
    pub fn insert(&self, id: Uuid, session: SharedSession) {
        self.clients.lock().insert(id, session);
    }

    /// True when the id was present (first removal).
    pub fn remove(&self, id: &Uuid) -> bool {
        self.clients.lock().remove(id).is_some()
    }

    #[must_use]
    pub fn online_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Owned snapshot for one tick round, taken under the registry mutex.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Uuid, SharedSession)> {
        self.clients
            .lock()
            .iter()
            .map(|(id, session)| (*id, Arc::clone(session)))
            .collect()
    }
}

/// State shared between the accept path, the tick thread and pool workers.
pub struct ServerShared {
    pub properties: ServerProperties,
    pub favicon:    Option<String>,
    pub clients:    ClientRegistry,
}

impl ServerShared {
    /// The status response JSON for the current MOTD, player counts and
    /// favicon.
    #[must_use]
    pub fn status_json(&self) -> String {
        let document = StatusDocument {
            version:     StatusVersion {
                name:     GAME_VERSION,
                protocol: PROTOCOL_VERSION,
            },
            players:     StatusPlayers {
                max:    self.properties.max_players,
                online: self.clients.online_count(),
            },
            description: StatusDescription {
                text: self.properties.motd.clone(),
            },
            favicon:     self.favicon.clone().unwrap_or_default(),
        };
        serde_json::to_string(&document).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Lifecycle of the orchestrator. Only the main thread mutates this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Starting,
    Running,
    Stopping,
}

pub struct Server {
    listener: TcpListener,
    pool:     Arc<TaskPool>,
    shared:   Arc<ServerShared>,
    status:   ServerStatus,
}

impl Server {
    /// Builds shared state and the worker pool, then binds last so nothing
    /// can connect before startup is complete. Bind failure is fatal.
    pub fn bind(properties: ServerProperties, favicon: Option<String>) -> Result<Self> {
        let shared = Arc::new(ServerShared {
            properties,
            favicon,
            clients: ClientRegistry::default(),
        });

        let workers = num_cpus::get().saturating_sub(1).max(1);
        let pool = Arc::new(TaskPool::new(workers));

        let ip = if shared.properties.server_ip.is_empty() {
            "0.0.0.0"
        } else {
            shared.properties.server_ip.as_str()
        };
        let addr = format!("{}:{}", ip, shared.properties.server_port);
        let listener =
            TcpListener::bind(&addr).with_context(|| format!("binding listener on {addr}"))?;
        info!("[STARTUP] Server listening on {}", addr);

        Ok(Self {
            listener,
            pool,
            shared,
            status: ServerStatus::Starting,
        })
    }

    #[must_use]
    pub fn status(&self) -> ServerStatus {
        self.status
    }

    #[must_use]
    pub fn shared(&self) -> &Arc<ServerShared> {
        &self.shared
    }

    /// Wraps one incoming connection as a fresh session.
    pub fn accept(&self) -> Result<Session> {
        let (stream, addr) = self.listener.accept()?;
        info!("[CONNECTION] New connection from {}", addr);
        Ok(Session::new(Arc::clone(&self.shared), stream, addr))
    }

    /// One tick round: snapshot the registry, then schedule a tick per
    /// session on the pool.
    pub fn tick(shared: &Arc<ServerShared>, pool: &TaskPool) {
        for (id, session) in shared.clients.snapshot() {
            let shared = Arc::clone(shared);
            pool.execute(move || tick_session(&shared, id, &session));
        }
    }

    /// Accept loop. Login runs synchronously on this path; configured
    /// sessions are handed to the registry for pool-driven ticking.
    pub fn run(mut self) -> Result<()> {
        self.status = ServerStatus::Running;
        info!(
            "[STARTUP] Startup complete, serving {} (protocol {})",
            GAME_VERSION, PROTOCOL_VERSION
        );

        let tick_shared = Arc::clone(&self.shared);
        let tick_pool = Arc::clone(&self.pool);
        // The handle is never joined: the tick loop runs for the life of
        // the process.
        let _tick_thread = thread::Builder::new()
            .name(String::from("tick"))
            .spawn(move || {
                loop {
                    Self::tick(&tick_shared, &tick_pool);
                    thread::sleep(Duration::from_millis(GAMELOOP_SLEEP_TICK));
                }
            })
            .context("spawning tick thread")?;

        loop {
            match self.accept() {
                Ok(session) => handle_session(session),
                Err(err) => error!("[NETWORK] Accept error: {}", err),
            }
        }
    }
}

/// Drives one fresh connection through login and registers it on success.
fn handle_session(mut session: Session) {
    let addr = session.addr();
    match session.login() {
        Ok(LoginOutcome::Configured) => {
            let Some(id) = session.uuid() else {
                warn!("[LOGIN] {} configured without an identifier, dropping", addr);
                return;
            };
            let name = session.username().unwrap_or_default().to_string();
            let shared = Arc::clone(session.server());
            shared.clients.insert(id, Arc::new(Mutex::new(session)));
            info!("[CONNECTION] '{}' ({}) registered in the client registry", name, id);
        }
        Ok(LoginOutcome::Closed) => {
            debug!("[CONNECTION] {} closed before registration", addr);
        }
        Err(err) => {
            debug!("[CONNECTION] {} session ended during login: {}", addr, err);
        }
    }
}

/// One pool-scheduled session tick. Errors never escape the task; the
/// session cleans up and leaves the registry instead.
fn tick_session(shared: &Arc<ServerShared>, id: Uuid, session: &SharedSession) {
    // A held lock means the previous tick is still in flight; skip the
    // round so the socket keeps a single owner.
    let Some(mut guard) = session.try_lock() else {
        return;
    };

    match guard.tick() {
        Ok(()) => {}
        Err(ProtocolError::Disconnected) => {
            if shared.clients.remove(&id) {
                info!("[CONNECTION] {} disconnected", guard.addr());
            }
        }
        Err(err) => {
            debug!("[CONNECTION] {} session error: {}", guard.addr(), err);
            guard.disconnect("Internal error").ok();
            if shared.clients.remove(&id) {
                info!("[CONNECTION] {} dropped after error", guard.addr());
            }
        }
    }
}
