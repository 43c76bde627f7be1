//! UDP transport shim. Sends and receives go over unicast per-peer
//! sockets rather than a multicast group: classic Paxos here talks to a
//! fixed, known-in-advance peer set (acceptors and proposers listed in
//! the config file).
//!
//! Frames `WireMessage`s onto UDP datagrams and applies the
//! oversize/undecodable drop policy; has no opinion on Paxos semantics.

use std::net::{SocketAddr, UdpSocket};

use log::{debug, warn};

use crate::error::{PaxosError, Result};
use crate::message::WireMessage;
use crate::types::MAX_VALUE_SIZE;

/// Datagrams are read into a buffer a little larger than
/// `MAX_VALUE_SIZE` so that oversize payloads can be detected and
/// dropped rather than silently truncated.
const DATAGRAM_BUFFER: usize = MAX_VALUE_SIZE + 256;

pub struct NetNode {
    socket: UdpSocket,
}

impl NetNode {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        Ok(NetNode { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn send(&self, msg: &WireMessage, to: SocketAddr) -> Result<()> {
        let encoded = bincode::serialize(msg).map_err(|e| PaxosError::Codec(e.to_string()))?;
        if encoded.len() > MAX_VALUE_SIZE {
            return Err(PaxosError::ValueTooLarge {
                size: encoded.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        self.socket.send_to(&encoded, to)?;
        Ok(())
    }

    /// Fans a message out to every peer: proposer prepare/accept
    /// requests, and acceptor phase-2 acks, all go to the full peer set.
    pub fn broadcast(&self, msg: &WireMessage, peers: &[SocketAddr]) -> Result<()> {
        for &peer in peers {
            self.send(msg, peer)?;
        }
        Ok(())
    }

    /// Blocks for the next datagram. Returns `Ok(None)` for a payload
    /// that is over `MAX_VALUE_SIZE` or fails to decode: a
    /// transport-boundary drop, not a caller-visible error.
    pub fn receive(&self) -> Result<Option<(WireMessage, SocketAddr)>> {
        let mut buf = vec![0u8; DATAGRAM_BUFFER];
        let (n, from) = self.socket.recv_from(&mut buf)?;

        if n > MAX_VALUE_SIZE {
            warn!("dropping oversize datagram of {} bytes from {}", n, from);
            return Ok(None);
        }

        match bincode::deserialize::<WireMessage>(&buf[..n]) {
            Ok(msg) => Ok(Some((msg, from))),
            Err(e) => {
                debug!("dropping undecodable datagram from {}: {}", from, e);
                Ok(None)
            }
        }
    }
}
