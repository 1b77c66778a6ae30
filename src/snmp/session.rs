//! Per-host SNMP session.
//!
//! Each session owns a connected UDP socket, allocates request-ids
//! monotonically from a random seed, and tracks its outstanding requests for
//! retransmission. Responses are correlated by request-id; anything else
//! arriving on the socket is discarded.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tracing::debug;

use crate::config::PollerSettings;

use super::pdu::{Pdu, PduType};
use super::SnmpError;

/// Default SNMP agent port.
pub const SNMP_PORT: u16 = 161;

struct Outstanding {
    datagram: Vec<u8>,
    sent_at: Instant,
    retries_left: u32,
}

/// An open SNMPv2c session to one modem.
pub struct Session {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    peer_name: String,
    community: String,
    retries: u32,
    timeout: Duration,
    next_request_id: i32,
    outstanding: HashMap<i32, Outstanding>,
}

impl Session {
    /// Bind and connect a socket to the peer. Retry count and per-request
    /// timeout are fixed for the session's lifetime.
    pub async fn open(
        peer_name: &str,
        peer: SocketAddr,
        community: &str,
        settings: &PollerSettings,
    ) -> Result<Session, SnmpError> {
        let local: SocketAddr = if peer.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;

        Ok(Session {
            socket: Arc::new(socket),
            peer,
            peer_name: peer_name.to_string(),
            community: community.to_string(),
            retries: settings.retries,
            timeout: settings.timeout,
            next_request_id: rand::random::<u16>() as i32 + 1,
            outstanding: HashMap::new(),
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    /// Shared handle for the dispatcher's receive multiplexing.
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    fn alloc_request_id(&mut self) -> i32 {
        let id = self.next_request_id;
        self.next_request_id = match self.next_request_id.checked_add(1) {
            Some(next) => next,
            None => 1,
        };
        id
    }

    /// Send a request, stamping it with a fresh request-id, and register it
    /// for retransmission. Returns the request-id on success.
    pub async fn send(&mut self, pdu: &mut Pdu) -> Result<i32, SnmpError> {
        pdu.request_id = self.alloc_request_id();
        let datagram = pdu.encode(&self.community);
        self.socket.send(&datagram).await?;
        self.outstanding.insert(
            pdu.request_id,
            Outstanding {
                datagram,
                sent_at: Instant::now(),
                retries_left: self.retries,
            },
        );
        Ok(pdu.request_id)
    }

    /// Correlate an incoming datagram with an outstanding request.
    ///
    /// Returns the decoded response, or `None` for anything that is not a
    /// well-formed response to a request we still track (delayed duplicates,
    /// community mismatches, stray traffic).
    pub fn accept(&mut self, datagram: &[u8]) -> Option<Pdu> {
        let (community, pdu) = match Pdu::decode(datagram) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(peer = %self.peer_name, error = %e, "discarding undecodable datagram");
                return None;
            }
        };
        if pdu.kind != PduType::Response || community != self.community.as_bytes() {
            return None;
        }
        self.outstanding.remove(&pdu.request_id)?;
        Some(pdu)
    }

    /// Retransmission sweep. Requests past their timeout are resent while
    /// retries remain; once a request has exhausted its retries the session
    /// is expired as a whole and all tracking is dropped.
    ///
    /// Returns `true` when the session expired.
    pub fn sweep(&mut self, now: Instant) -> bool {
        let mut expired = false;
        for (&request_id, entry) in self.outstanding.iter_mut() {
            if now.duration_since(entry.sent_at) < self.timeout {
                continue;
            }
            if entry.retries_left == 0 {
                expired = true;
                continue;
            }
            entry.retries_left -= 1;
            entry.sent_at = now;
            if let Err(e) = self.socket.try_send(&entry.datagram) {
                debug!(peer = %self.peer_name, request_id, error = %e, "retransmit failed");
            }
        }
        if expired {
            self.outstanding.clear();
        }
        expired
    }

    /// Drop all outstanding tracking without touching the socket.
    pub fn abandon(&mut self) {
        self.outstanding.clear();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("peer_name", &self.peer_name)
            .field("outstanding", &self.outstanding.len())
            .finish()
    }
}
