#![allow(dead_code)]

//! Per-connection session: socket, scratch buffer, protocol state and, once
//! login completes, the player identity.
//!
//! `tick` reads and handles exactly one packet. The scratch buffer is
//! cleared (allocation kept) between packets; anything the session keeps
//! across ticks (the player name, the identifier) is owned data, never a
//! borrow of the scratch region.

use std::fmt;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;

use ferrocraft_codec::wire;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::server::ServerShared;
use crate::network::configuration::{ClientboundConfiguration, ServerboundConfiguration};
use crate::network::handshake::{NextState, ServerboundHandshake};
use crate::network::login::{ClientboundLogin, ServerboundLogin};
use crate::network::play::ServerboundPlay;
use crate::network::status::{ClientboundStatus, ServerboundStatus};
use crate::network::{ProtocolError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    Handshake,
    Status,
    Login,
    Config,
    Play,
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake => write!(f, "handshake"),
            Self::Status => write!(f, "status"),
            Self::Login => write!(f, "login"),
            Self::Config => write!(f, "config"),
            Self::Play => write!(f, "play"),
        }
    }
}

/// How the synchronous pre-registration phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Reached the config state; the caller registers the session.
    Configured,
    /// Graceful end: status ping served, legacy probe, or peer close.
    Closed,
}

pub struct Session {
    server:   Arc<ServerShared>,
    stream:   TcpStream,
    addr:     SocketAddr,
    state:    ProtocolState,
    scratch:  Vec<u8>,
    username: Option<String>,
    uuid:     Option<Uuid>,
}

impl Session {
    #[must_use]
    pub fn new(server: Arc<ServerShared>, stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            server,
            stream,
            addr,
            state: ProtocolState::Handshake,
            scratch: Vec::new(),
            username: None,
            uuid: None,
        }
    }

    #[must_use]
    pub fn server(&self) -> &Arc<ServerShared> {
        &self.server
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn uuid(&self) -> Option<Uuid> {
        self.uuid
    }

    /// Reads and handles exactly one packet.
    pub fn tick(&mut self) -> Result<()> {
        self.scratch.clear();
        match self.state {
            ProtocolState::Handshake => self.tick_handshake(),
            ProtocolState::Status => self.tick_status(),
            ProtocolState::Login => self.tick_login(),
            ProtocolState::Config | ProtocolState::Play => self.tick_unimplemented(),
        }
    }

    fn tick_handshake(&mut self) -> Result<()> {
        match ServerboundHandshake::read(&mut self.stream, &mut self.scratch)? {
            ServerboundHandshake::Handshake {
                protocol_version,
                next_state,
                ..
            } => {
                let next = match next_state {
                    NextState::Status => ProtocolState::Status,
                    NextState::Login => ProtocolState::Login,
                };
                debug!(
                    "[CONNECTION] {} handshake (protocol {}): {} -> {}",
                    self.addr, protocol_version, self.state, next
                );
                self.state = next;
                Ok(())
            }
            ServerboundHandshake::Legacy => Err(ProtocolError::LegacyClient),
        }
    }

    fn tick_status(&mut self) -> Result<()> {
        match ServerboundStatus::read(&mut self.stream, &mut self.scratch)? {
            ServerboundStatus::StatusRequest => {
                let json = self.server.status_json();
                ClientboundStatus::StatusResponse { json }.write(&mut self.stream)
            }
            ServerboundStatus::PingRequest { payload } => {
                ClientboundStatus::PingResponse { payload }.write(&mut self.stream)?;
                // The list ping is over once the pong is echoed.
                Err(ProtocolError::Disconnected)
            }
        }
    }

    fn tick_login(&mut self) -> Result<()> {
        match ServerboundLogin::read(&mut self.stream, &mut self.scratch)? {
            ServerboundLogin::LoginStart { name, uuid } => {
                // Offline mode: the client-sent identifier is ignored and
                // the name derives the canonical one.
                debug!("[LOGIN] {} login start for '{}' (client sent {})", self.addr, name, uuid);
                let id = wire::uuid_v3(name.as_bytes());
                ClientboundLogin::LoginSuccess {
                    uuid:     id,
                    username: name.clone(),
                }
                .write(&mut self.stream)?;
                info!("[LOGIN] Player '{}' ({}) logged in from {}", name, id, self.addr);
                self.username = Some(name);
                self.uuid = Some(id);
                Ok(())
            }
            ServerboundLogin::LoginAcknowledged => {
                debug!("[LOGIN] {} acknowledged: {} -> {}", self.addr, self.state, ProtocolState::Config);
                self.state = ProtocolState::Config;
                Ok(())
            }
            other => {
                // Encryption / plugin responses are accepted silently in
                // offline mode.
                debug!("[LOGIN] {} ignoring {:?}", self.addr, other);
                Ok(())
            }
        }
    }

    /// Config and play packets are unhandled: the packet is consumed whole
    /// and answered with the config-form disconnect.
    fn tick_unimplemented(&mut self) -> Result<()> {
        let read: Result<()> = match self.state {
            ProtocolState::Config => {
                ServerboundConfiguration::read(&mut self.stream, &mut self.scratch).map(|p| match p {})
            }
            _ => ServerboundPlay::read(&mut self.stream, &mut self.scratch).map(|p| match p {}),
        };

        match read {
            Err(ProtocolError::UnknownPacket { state, id }) => {
                debug!("[CONFIG] {} sent unhandled {} packet {:#04x}", self.addr, state, id);
                ClientboundConfiguration::Disconnect {
                    reason: text_reason("Unimplemented"),
                }
                .write(&mut self.stream)?;
                Err(ProtocolError::Disconnected)
            }
            result => result,
        }
    }

    /// Blocking loop of `tick` through the pre-registration phase, until
    /// the session reaches config or ends. Legacy probes and graceful
    /// closes are absorbed as normal terminations.
    pub fn login(&mut self) -> Result<LoginOutcome> {
        loop {
            match self.tick() {
                Ok(()) => {
                    if self.state == ProtocolState::Config {
                        return Ok(LoginOutcome::Configured);
                    }
                }
                Err(ProtocolError::Disconnected) => return Ok(LoginOutcome::Closed),
                Err(ProtocolError::LegacyClient) => {
                    debug!("[CONNECTION] {} legacy ping, closing without reply", self.addr);
                    return Ok(LoginOutcome::Closed);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Writes the state-appropriate disconnect packet, ticking the session
    /// forward first while the current state has no disconnect form.
    pub fn disconnect(&mut self, reason: &str) -> Result<()> {
        loop {
            match self.state {
                ProtocolState::Login => {
                    return ClientboundLogin::Disconnect {
                        reason: text_reason(reason),
                    }
                    .write(&mut self.stream);
                }
                ProtocolState::Config | ProtocolState::Play => {
                    return ClientboundConfiguration::Disconnect {
                        reason: text_reason(reason),
                    }
                    .write(&mut self.stream);
                }
                ProtocolState::Handshake | ProtocolState::Status => self.tick()?,
            }
        }
    }
}

fn text_reason(reason: &str) -> String {
    json!({ "text": reason }).to_string()
}
