//! UDP pose stream
//!
//! Streams every report as one datagram to each known destination.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────────┬──────────────────────┐
//! │ Length (4 bytes) │ JSON PoseReport      │
//! │ Big-endian u32   │ (~150 bytes typical) │
//! └──────────────────┴──────────────────────┘
//! ```
//!
//! # Client Registration
//!
//! Destinations come from two places:
//!
//! 1. `[sink] destinations` in the config, fixed for the process lifetime
//! 2. Any host that sends a datagram (content ignored) to the bound
//!    `server_identifier:port`. Registrations are drained without blocking at
//!    the start of every publish, up to [`MAX_CLIENTS`]. A client whose send
//!    fails is dropped, freeing its slot.

use super::PoseSink;
use crate::core::types::PoseReport;
use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Upper bound on self-registered clients
pub const MAX_CLIENTS: usize = 16;

/// Pre-allocated send buffer size (prefix + JSON report)
const MAX_UDP_BUFFER_SIZE: usize = 1024;

/// Encode a report as `[u32 BE length][JSON]` into `buffer`.
///
/// The buffer is cleared first and reused across calls.
pub fn encode_frame(report: &PoseReport, buffer: &mut Vec<u8>) -> Result<()> {
    let payload = serde_json::to_vec(report).map_err(|e| Error::Serialization(e.to_string()))?;
    let len = (payload.len() as u32).to_be_bytes();

    buffer.clear();
    buffer.extend_from_slice(&len);
    buffer.extend_from_slice(&payload);
    Ok(())
}

/// Decode one length-prefixed datagram.
pub fn decode_frame(datagram: &[u8]) -> Result<PoseReport> {
    let Some((prefix, payload)) = datagram.split_first_chunk::<4>() else {
        return Err(Error::Serialization("datagram shorter than prefix".to_string()));
    };
    let len = u32::from_be_bytes(*prefix) as usize;
    if payload.len() != len {
        return Err(Error::Serialization(format!(
            "length prefix {} does not match payload {}",
            len,
            payload.len()
        )));
    }
    serde_json::from_slice(payload).map_err(|e| Error::Serialization(e.to_string()))
}

/// UDP unicast pose publisher
pub struct UdpPoseSink {
    socket: UdpSocket,
    /// Configured destinations
    destinations: Vec<SocketAddr>,
    /// Hosts that registered by sending a datagram
    clients: Vec<SocketAddr>,
    send_buffer: Vec<u8>,
    recv_buffer: [u8; 64],
    /// Set once the client limit warning has been logged
    limit_warned: bool,
}

impl UdpPoseSink {
    /// Bind `host:port` and resolve the fixed destinations.
    pub fn bind(host: &str, port: u16, destinations: &[String]) -> Result<Self> {
        let socket = UdpSocket::bind((host, port)).map_err(|e| {
            Error::Other(format!("Failed to bind pose stream on {}:{}: {}", host, port, e))
        })?;
        socket.set_nonblocking(true)?;

        let mut resolved = Vec::with_capacity(destinations.len());
        for dest in destinations {
            let addr = dest
                .to_socket_addrs()
                .map_err(|e| Error::Config(format!("Invalid destination '{}': {}", dest, e)))?
                .next()
                .ok_or_else(|| Error::Config(format!("Destination '{}' did not resolve", dest)))?;
            resolved.push(addr);
        }

        log::info!(
            "Pose stream bound on {} ({} fixed destination(s))",
            socket.local_addr()?,
            resolved.len()
        );

        Ok(Self {
            socket,
            destinations: resolved,
            clients: Vec::new(),
            send_buffer: Vec::with_capacity(MAX_UDP_BUFFER_SIZE),
            recv_buffer: [0; 64],
            limit_warned: false,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Register senders of any pending datagrams.
    fn drain_registrations(&mut self) {
        if self.clients.len() < MAX_CLIENTS {
            self.limit_warned = false;
        }
        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((_, addr)) => {
                    if self.clients.contains(&addr) || self.destinations.contains(&addr) {
                        continue;
                    }
                    if self.clients.len() >= MAX_CLIENTS {
                        if !self.limit_warned {
                            log::warn!(
                                "Ignoring pose stream client {}: client limit of {} reached",
                                addr,
                                MAX_CLIENTS
                            );
                            self.limit_warned = true;
                        }
                        log::debug!("Ignoring pose stream client {}", addr);
                        continue;
                    }
                    log::info!("Pose stream client registered: {}", addr);
                    self.clients.push(addr);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    // ICMP port-unreachable from a stale client surfaces here on some platforms
                    log::debug!("Pose stream receive error: {}", e);
                    break;
                }
            }
        }
    }
}

impl PoseSink for UdpPoseSink {
    fn publish(&mut self, report: &PoseReport) -> Result<()> {
        self.drain_registrations();
        encode_frame(report, &mut self.send_buffer)?;

        let mut first_error = None;
        for target in &self.destinations {
            match self.socket.send_to(&self.send_buffer, target) {
                Ok(_) => log::trace!("Sent pose seq {} to {}", report.sequence, target),
                Err(e) => {
                    first_error.get_or_insert(Error::Other(format!(
                        "Failed to send pose to {}: {}",
                        target, e
                    )));
                }
            }
        }

        let socket = &self.socket;
        let frame = &self.send_buffer;
        self.clients.retain(|client| match socket.send_to(frame, client) {
            Ok(_) => {
                log::trace!("Sent pose seq {} to {}", report.sequence, client);
                true
            }
            Err(e) => {
                log::info!("Dropping pose stream client {}: {}", client, e);
                false
            }
        });

        first_error.map_or(Ok(()), Err)
    }
}
